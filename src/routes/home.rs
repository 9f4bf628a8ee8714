pub async fn index() -> &'static str {
    "server is running"
}
