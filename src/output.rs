use std::sync::OnceLock;

use tokio::sync::Mutex;

static PRINT_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn lock() -> &'static Mutex<()> {
    PRINT_LOCK.get_or_init(|| Mutex::new(()))
}

/// Print one block of text atomically with respect to other listing units,
/// so concurrently running versions do not interleave their SQL-and-result
/// output.
pub async fn print_block(text: &str) {
    let _guard = lock().lock().await;
    println!("{text}");
}
