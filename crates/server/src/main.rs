//! minesrace Server Binary
//!
//! Runs the HTTP backend for match coordination, the leaderboard, and
//! authentication. Clients poll; there is no push channel.

#[tokio::main]
async fn main() {
    msr_core::log();
    msr_server::run().await.unwrap();
}
