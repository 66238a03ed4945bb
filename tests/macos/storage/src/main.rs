use ubiquity_channel::{
    DEFAULT_CHANNEL_NAME, GET_ICLOUD_DOCUMENTS_PATH, MethodCall, MethodChannel, MethodResponse,
    register_icloud,
};
use ubiquity_storage::StorageRootResolver;

#[tokio::main]
async fn main() {
    println!("Testing iCloud storage root...");

    let resolver = StorageRootResolver::platform();
    match resolver.resolve_default().await {
        Ok(root) => println!(
            "Storage root: {} (created: {})",
            root.path().display(),
            root.was_created()
        ),
        Err(e) => println!("Resolution failed [{}]: {}", e.code(), e),
    }

    println!("Calling {GET_ICLOUD_DOCUMENTS_PATH} over {DEFAULT_CHANNEL_NAME}...");
    let mut channel = MethodChannel::new(DEFAULT_CHANNEL_NAME);
    register_icloud(&mut channel, resolver);

    match channel.call(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH)).await {
        MethodResponse::Success(path) => println!("Documents path: {path}"),
        MethodResponse::Error(e) => println!(
            "Error {}: {} ({})",
            e.code,
            e.message,
            e.details.unwrap_or_default()
        ),
        MethodResponse::NotImplemented => println!("Method not implemented"),
    }

    println!("Calling an unknown method...");
    let response = channel.call(MethodCall::new("getICloudTrashPath")).await;
    println!("Response: {response:?}");
}
