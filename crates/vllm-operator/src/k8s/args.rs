use crate::operator::crd::VllmConfig;

/// Renders the engine config as `vllm serve` flags.
///
/// Flags come out in a fixed order (gpu memory utilization, log level, block
/// size, max model len, port) and only when set, so equal configs always
/// produce equal argument lists.
pub fn engine_args(config: &VllmConfig) -> Vec<String> {
    let mut args = Vec::new();

    push_str(
        &mut args,
        "--gpu-memory-utilization",
        &config.gpu_memory_utilization,
    );
    push_str(&mut args, "--log-level", &config.log_level);
    push_int(&mut args, "--block-size", config.block_size);
    push_int(&mut args, "--max-model-len", config.max_model_len);
    push_int(&mut args, "--port", config.port);

    args
}

fn push_str(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

fn push_int(args: &mut Vec<String>, flag: &str, value: i32) {
    if value != 0 {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
