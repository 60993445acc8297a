#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use roomcount_tool::{BookingExport, http_api};

    let addr: SocketAddr = std::env::var("ROOMCOUNT_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    println!("roomcount-tool HTTP API listening on http://{addr}");
    let export = BookingExport::new();
    http_api::serve(addr, export).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
