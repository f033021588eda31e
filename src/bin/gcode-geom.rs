use anyhow::Result;
use gcode_geometry::cli::run;

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}
