//! Render the simulated camera image of an SLM phase pattern
//!
//! Builds an SLM showing a blaze and/or lens, places a simulated camera in its
//! far-field and writes the captured frame to a PNG.

use clap::Parser;
use log::info;
use ndarray::Array2;
use shared::camera_interface::CameraInterface;
use shared::image_size::PixelShape;
use slm_simulator::config::SimulatedCameraConfig;
use slm_simulator::hardware::{AmplitudeProfile, SimulatedSlm};
use slm_simulator::holography::phase_patterns;
use slm_simulator::image_proc::save_intensity_image;
use slm_simulator::SimulatedCamera;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Command line arguments for the SLM camera renderer
#[derive(Parser, Debug)]
#[command(version, about = "Simulated SLM far-field camera renderer")]
struct Args {
    /// SLM width in pixels
    #[arg(long, default_value_t = 512)]
    slm_width: usize,

    /// SLM height in pixels
    #[arg(long, default_value_t = 512)]
    slm_height: usize,

    /// SLM pixel pitch along x, in wavelengths
    #[arg(long, default_value_t = 1.0)]
    dx: f64,

    /// SLM pixel pitch along y, in wavelengths
    #[arg(long, default_value_t = 1.0)]
    dy: f64,

    /// Gaussian illumination waist in SLM pixels (uniform if omitted)
    #[arg(long)]
    waist: Option<f64>,

    /// Camera width in pixels (defaults to the SLM width)
    #[arg(long)]
    width: Option<usize>,

    /// Camera height in pixels (defaults to the SLM height)
    #[arg(long)]
    height: Option<usize>,

    /// Camera rotation in radians
    #[arg(long, default_value_t = 0.0)]
    theta: f64,

    /// Camera offset along x, in camera pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    /// Camera offset along y, in camera pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Effective focal length in pixels per radian (defaults to the minimum)
    #[arg(long)]
    f_eff: Option<f64>,

    /// Blaze vector x component, normalized k-space
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    kx: f64,

    /// Blaze vector y component, normalized k-space
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    ky: f64,

    /// Lens focal length in wavelengths (no lens if omitted)
    #[arg(long, allow_hyphen_values = true)]
    lens: Option<f64>,

    /// Exposure gain
    #[arg(long, default_value_t = 1.0)]
    exposure: f64,

    /// JSON camera configuration; overrides the camera flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file path
    #[arg(long, default_value = "test_output/slm_camera_render.png")]
    output: PathBuf,
}

impl Args {
    fn camera_config(&self) -> Result<SimulatedCameraConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &self.config {
            info!("Loading camera configuration from {}", path.display());
            return Ok(SimulatedCameraConfig::from_json_file(path)?);
        }

        let mut config = SimulatedCameraConfig::new()
            .with_theta(self.theta)
            .with_offset((self.offset_x, self.offset_y))
            .with_exposure(self.exposure);
        if self.width.is_some() || self.height.is_some() {
            config = config.with_resolution(PixelShape::new(
                self.width.unwrap_or(self.slm_width),
                self.height.unwrap_or(self.slm_height),
            ));
        }
        if let Some(f_eff) = self.f_eff {
            config = config.with_f_eff(f_eff);
        }
        Ok(config)
    }

    fn phase(&self, shape: PixelShape) -> Array2<f64> {
        let mut phase = phase_patterns::blaze(shape, self.dx, self.dy, (self.kx, self.ky));
        if let Some(focal) = self.lens {
            phase = phase + phase_patterns::lens(shape, self.dx, self.dy, focal);
        }
        phase
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let slm_shape = PixelShape::new(args.slm_width, args.slm_height);
    let mut slm = SimulatedSlm::new(slm_shape, args.dx, args.dy)?;
    if let Some(waist) = args.waist {
        slm = slm.with_amplitude(AmplitudeProfile::Gaussian {
            waist_x: waist,
            waist_y: waist,
        })?;
    }
    slm.write_phase(&args.phase(slm_shape))?;
    let slm = Arc::new(RwLock::new(slm));

    let config = args.camera_config()?;
    let mut camera = SimulatedCamera::new(Arc::clone(&slm), config)?;

    println!("SLM camera renderer");
    println!("===================");
    let (dx, dy) = camera.slm_pitch();
    println!("SLM: {slm_shape} at pitch ({dx}, {dy})");
    println!("Camera: {}", camera.shape());
    println!(
        "f_eff: {:.2} pix/rad (minimum {:.2})",
        camera.f_eff(),
        camera.f_min()
    );
    println!("Padded k-space: {}", camera.padded_shape());
    println!("Sampling: {:?}", camera.sampling_mode());

    let image = camera.get_image(false)?;
    let total: f64 = image.sum();
    let peak = image.iter().copied().fold(0.0_f64, f64::max);
    println!("Total intensity: {total:.4e}, peak: {peak:.4e}");

    save_intensity_image(&image, &args.output)?;
    println!("Saved image to {}", args.output.display());
    Ok(())
}
