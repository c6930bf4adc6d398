use vllm_cli::exec;
use vllm_common::error;

#[tokio::main]
async fn main() {
    match exec().await {
        Ok(_) => (),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
