use std::borrow::Cow;
use std::sync::mpsc;
use std::time::Instant;

use gb_matrix::{Layout, Matrix};
use wgpu::util::DeviceExt;

use crate::backend::{check_dims, EngineInfo, GemmBackend, TimedRun};
use crate::error::{BackendError, Result};

const GEMM_SHADER: &str = include_str!("gemm.wgsl");
const WORKGROUP_DIM: u32 = 16;

/// Shader dimensions, carried in a uniform buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GemmParams {
    m: u32,
    n: u32,
    k: u32,
    _pad: u32,
}

/// GPU backend driving a WGSL compute kernel through wgpu.
///
/// Construction acquires the adapter and device and compiles the
/// pipeline, so a constructed backend has already proven the device
/// answers. Operand upload and result readback happen outside the
/// timed region; the timed loop is dispatch-only, drained with a
/// blocking poll before the clock stops.
#[derive(Debug)]
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    adapter_info: wgpu::AdapterInfo,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Tightest per-buffer byte ceiling the device enforces for a storage
/// binding.
fn max_storage_bytes(limits: &wgpu::Limits) -> u64 {
    limits
        .max_buffer_size
        .min(limits.max_storage_buffer_binding_size as u64)
}

/// Reject shapes whose operand buffers the device cannot allocate or
/// bind. An oversized `create_buffer` is a device validation fault, so
/// the shape is refused before any allocation happens.
fn check_capacity(m: usize, k: usize, n: usize, limits: &wgpu::Limits) -> Result<()> {
    let elem = std::mem::size_of::<f32>() as u128;
    let a_bytes = m as u128 * k as u128 * elem;
    let b_bytes = k as u128 * n as u128 * elem;
    let c_bytes = m as u128 * n as u128 * elem;
    let largest = a_bytes.max(b_bytes).max(c_bytes);
    let limit = max_storage_bytes(limits) as u128;
    if largest > limit {
        return Err(BackendError::Compute {
            reason: format!(
                "{m}x{k}x{n} needs a {largest}-byte operand buffer, over the device limit of {limit} bytes"
            ),
        });
    }
    Ok(())
}

impl WgpuBackend {
    /// Acquire an adapter and device and compile the GEMM pipeline.
    ///
    /// Fails with `DeviceUnavailable` when no adapter responds or the
    /// device request is denied.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .map_err(|err| BackendError::DeviceUnavailable {
            reason: format!("no compatible adapter: {err}"),
        })?;
        let adapter_info = adapter.get_info();
        log::info!(
            "wgpu adapter: {} ({:?} via {:?})",
            adapter_info.name,
            adapter_info.device_type,
            adapter_info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("gemm-bench device"),
            required_features: wgpu::Features::empty(),
            // The stock limit defaults cap storage buffers at 128 MiB
            // regardless of hardware; take what the adapter offers.
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|err| BackendError::DeviceUnavailable {
            reason: format!("device request failed: {err}"),
        })?;

        // Shader and pipeline faults land in this scope instead of the
        // fatal uncaptured-error handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gemm shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(GEMM_SHADER)),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gemm bind group layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                uniform_entry(3),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gemm pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("gemm pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("gemm_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(BackendError::DeviceUnavailable {
                reason: format!("pipeline setup failed: {err}"),
            });
        }

        Ok(WgpuBackend {
            device,
            queue,
            pipeline,
            bind_group_layout,
            adapter_info,
        })
    }

    /// Construct the backend for AUTO selection.
    ///
    /// Stricter than `new`: software rasterizers count as no device,
    /// and the device must complete a real allocation round-trip before
    /// the probe reports success.
    pub fn probe() -> Result<Self> {
        let backend = Self::new()?;
        if backend.adapter_info.device_type == wgpu::DeviceType::Cpu {
            return Err(BackendError::DeviceUnavailable {
                reason: format!(
                    "only a software adapter ({}) is available",
                    backend.adapter_info.name
                ),
            });
        }
        backend.touch_allocation()?;
        Ok(backend)
    }

    /// Allocate, write, and drain a small buffer on the device.
    fn touch_allocation(&self) -> Result<()> {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("probe buffer"),
            size: 1024,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(&buffer, 0, &[0u8; 16]);
        self.queue.submit([]);
        self.poll_wait()
    }

    /// Block until all submitted work has completed.
    fn poll_wait(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| BackendError::Compute {
                reason: format!("device poll failed: {err}"),
            })?;
        Ok(())
    }

    /// Run `f` between pushed wgpu error scopes.
    ///
    /// Validation and allocation faults otherwise reach the device's
    /// uncaptured-error handler, which aborts the process. A captured
    /// fault surfaces as a `Compute` error; when `f` already failed,
    /// its own error wins.
    fn capture_faults<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let result = f();
        let mut fault = None;
        for _ in 0..2 {
            if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
                fault = fault.or(Some(BackendError::Compute {
                    reason: format!("device fault: {err}"),
                }));
            }
        }
        match (result, fault) {
            (Ok(_), Some(err)) => Err(err),
            (result, _) => result,
        }
    }

    /// Encode and submit one GEMM dispatch.
    fn dispatch(&self, bind_group: &wgpu::BindGroup, groups_x: u32, groups_y: u32) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gemm encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("gemm pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        self.queue.submit([encoder.finish()]);
    }

    /// Copy the product buffer to a staging buffer and map it back.
    fn read_back(&self, c_buf: &wgpu::Buffer, m: usize, n: usize) -> Result<Matrix> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gemm staging"),
            size: c_buf.size(),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });
        encoder.copy_buffer_to_buffer(c_buf, 0, &staging, 0, c_buf.size());
        self.queue.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.poll_wait()?;
        rx.recv()
            .map_err(|_| BackendError::Compute {
                reason: "map callback dropped".to_string(),
            })?
            .map_err(|err| BackendError::Compute {
                reason: format!("result readback failed: {err}"),
            })?;

        let data = {
            let view = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&view).to_vec()
        };
        staging.unmap();
        Ok(Matrix::from_vec(m, n, Layout::RowMajor, data))
    }
}

impl GemmBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn engine(&self) -> EngineInfo {
        EngineInfo {
            name: "wgpu".to_string(),
            version: if self.adapter_info.driver_info.is_empty() {
                None
            } else {
                Some(self.adapter_info.driver_info.clone())
            },
        }
    }

    fn multiply_timed(&self, a: &Matrix, b: &Matrix, repeats: usize) -> Result<TimedRun> {
        let (m, k, n) = check_dims(a, b)?;
        if m == 0 || n == 0 || k == 0 {
            // Zero-size storage bindings fail device validation.
            return Err(BackendError::Compute {
                reason: format!("degenerate dimensions {m}x{k}x{n}"),
            });
        }
        if m > u32::MAX as usize || n > u32::MAX as usize || k > u32::MAX as usize {
            return Err(BackendError::Compute {
                reason: format!("dimensions {m}x{k}x{n} exceed 32-bit shader limits"),
            });
        }
        check_capacity(m, k, n, &self.device.limits())?;

        self.capture_faults(|| {
            // Upload outside the timed region. B goes up column-major;
            // see gemm.wgsl for the traversal it serves.
            let a_host = a.to_layout(Layout::RowMajor);
            let b_host = b.to_layout(Layout::ColMajor);
            let a_buf = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gemm a"),
                    contents: bytemuck::cast_slice(a_host.as_slice()),
                    usage: wgpu::BufferUsages::STORAGE,
                });
            let b_buf = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gemm b"),
                    contents: bytemuck::cast_slice(b_host.as_slice()),
                    usage: wgpu::BufferUsages::STORAGE,
                });
            let c_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("gemm c"),
                size: (m * n * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            });
            let params = GemmParams {
                m: m as u32,
                n: n as u32,
                k: k as u32,
                _pad: 0,
            };
            let params_buf = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gemm params"),
                    contents: bytemuck::bytes_of(&params),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("gemm bind group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: a_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: b_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: c_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: params_buf.as_entire_binding(),
                    },
                ],
            });

            let groups_x = (n as u32).div_ceil(WORKGROUP_DIM);
            let groups_y = (m as u32).div_ceil(WORKGROUP_DIM);

            // Warmup dispatch, fully drained, before the clock starts.
            self.dispatch(&bind_group, groups_x, groups_y);
            self.poll_wait()?;

            let start = Instant::now();
            for _ in 0..repeats {
                self.dispatch(&bind_group, groups_x, groups_y);
            }
            // Every submitted multiply must land inside the measurement.
            self.poll_wait()?;
            let elapsed = start.elapsed();

            let output = self.read_back(&c_buf, m, n)?;
            Ok(TimedRun { elapsed, output })
        })
    }
}
