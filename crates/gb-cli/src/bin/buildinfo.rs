//! Prints compile-time toolchain and target information as one JSON
//! object, for attaching host metadata to benchmark result archives.

use serde_json::{json, Value};

fn compiler_info() -> Value {
    json!({
        "version_string": format!("rustc {}", env!("VERGEN_RUSTC_SEMVER")),
        "is_rustc": true,
        "optimize_any": !cfg!(debug_assertions),
        "fast_math": cfg!(target_feature = "fma"),
        "fma": cfg!(target_feature = "fma"),
        "sse": cfg!(target_feature = "sse"),
        "sse2": cfg!(target_feature = "sse2"),
        "sse3": cfg!(target_feature = "sse3"),
        "ssse3": cfg!(target_feature = "ssse3"),
        "sse4_1": cfg!(target_feature = "sse4.1"),
        "sse4_2": cfg!(target_feature = "sse4.2"),
        "avx": cfg!(target_feature = "avx"),
        "avx2": cfg!(target_feature = "avx2"),
        "avx512f": cfg!(target_feature = "avx512f"),
        "avx512bw": cfg!(target_feature = "avx512bw"),
        "avx512dq": cfg!(target_feature = "avx512dq"),
        "avx512vl": cfg!(target_feature = "avx512vl"),
        "neon": cfg!(target_feature = "neon"),
    })
}

fn target_info() -> Value {
    // "darwin" keeps the OS name aligned with companion tools in other
    // languages.
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    json!({
        "arch": std::env::consts::ARCH,
        "os": os,
        "endianness": if cfg!(target_endian = "little") { "little" } else { "big" },
        "pointer_bits": usize::BITS,
        "triple": env!("VERGEN_CARGO_TARGET_TRIPLE"),
    })
}

fn main() {
    let info = json!({
        "compiler": compiler_info(),
        "target": target_info(),
    });
    println!("{info}");
}
