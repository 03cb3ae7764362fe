//! Example: Resolve one image path to its best loadable candidate.

use std::sync::Arc;

use pixo_image::{
    derive_candidates, DecodeProber, DecoderCapability, HttpFetcher, ImageLoader, ImageRequest,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("pixo-image v{}", pixo_image::VERSION);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/photos/team.png".to_string());

    println!("candidates for {path}:");
    for candidate in derive_candidates(&path) {
        println!("  {} ({:?})", candidate.url, candidate.format);
    }

    let loader = ImageLoader::new(
        ImageRequest::new(&path),
        Arc::new(DecodeProber::new(Arc::new(HttpFetcher::new()?))),
        Arc::new(DecoderCapability),
    );
    smol::block_on(loader.start());
    println!("state: {:?}", loader.state());

    Ok(())
}
