#[tokio::main]
async fn main() {
    saladly::start_server().await;
}
