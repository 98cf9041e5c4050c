use gb_backend::EngineInfo;
use serde::{Serialize, Serializer};

/// Round to a fixed number of decimal places.
///
/// Applied at serialization only; everything upstream keeps full
/// precision.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn one_dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 1))
}

fn two_dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

fn six_dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 6))
}

/// Identity of the library that did (or was asked to do) the work.
#[derive(Debug, Clone, Serialize)]
pub struct Engine {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<EngineInfo> for Engine {
    fn from(info: EngineInfo) -> Self {
        Engine {
            name: info.name,
            version: info.version,
        }
    }
}

/// Echo of the run parameters plus operand-size accounting.
#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    #[serde(rename = "M")]
    pub m: usize,
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "K")]
    pub k: usize,
    pub repeats: usize,
    /// Bytes of f32 storage for A, B, and C together.
    pub expected_bytes_total: u64,
    #[serde(serialize_with = "one_dp")]
    pub expected_megabytes_total: f64,
}

impl InputSummary {
    pub fn new(m: usize, n: usize, k: usize, repeats: usize) -> Self {
        let (m64, n64, k64) = (m as u64, n as u64, k as u64);
        let bytes = 4 * (m64 * k64 + k64 * n64 + m64 * n64);
        InputSummary {
            m,
            n,
            k,
            repeats,
            expected_bytes_total: bytes,
            expected_megabytes_total: bytes as f64 / (1024.0 * 1024.0),
        }
    }
}

/// Measured results of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct OutputMetrics {
    #[serde(serialize_with = "six_dp")]
    pub time_sec: f64,
    #[serde(serialize_with = "two_dp")]
    pub gflops: f64,
    #[serde(serialize_with = "six_dp")]
    pub checksum: f64,
}

/// One benchmark report, printed as a single JSON line.
///
/// Exactly one of `error` and `output` is present. Field order is the
/// wire order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub engine: Engine,
    pub input: InputSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMetrics>,
}

impl Report {
    pub fn success(engine: Engine, input: InputSummary, output: OutputMetrics) -> Self {
        Report {
            engine,
            input,
            error: None,
            output: Some(output),
        }
    }

    pub fn failure(engine: Engine, input: InputSummary, error: String) -> Self {
        Report {
            engine,
            input,
            error: Some(error),
            output: None,
        }
    }

    /// Render the single output line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
