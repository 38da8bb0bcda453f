//! ChemCalc
//!
//! An MCP server for clinical chemistry calculations.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use chemcalc::build_info;
use chemcalc::config::Config;
use chemcalc::mcp::ChemCalcService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chemcalc=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();

    // Print startup banner to stderr
    build_info::print_startup_banner(&config);
    let build = build_info::BuildInfo::current().label();
    tracing::info!(%build, "Starting MCP server on stdio");

    // Create the ChemCalc service
    let service = ChemCalcService::new(config);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
