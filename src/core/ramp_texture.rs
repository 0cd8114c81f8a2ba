use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::channel::oneshot;
use log::{debug, warn};

use crate::config::BackdropConfig;

/// Where the color ramp comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RampSource {
    /// Chrome ramp generated in code
    Builtin,
    File(PathBuf),
}

impl RampSource {
    pub fn from_config(config: &BackdropConfig) -> Self {
        match &config.texture_path {
            Some(path) => RampSource::File(path.clone()),
            None => RampSource::Builtin,
        }
    }
}

/// Decoded RGBA8 ramp image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Color stops of the built-in ramp, position then sRGB color
const CHROME_STOPS: [(f32, [u8; 3]); 7] = [
    (0.00, [18, 18, 26]),
    (0.18, [92, 96, 112]),
    (0.32, [214, 218, 228]),
    (0.46, [54, 58, 70]),
    (0.62, [238, 240, 246]),
    (0.80, [118, 124, 140]),
    (1.00, [250, 250, 255]),
];

const BUILTIN_WIDTH: u32 = 256;

impl RampImage {
    /// Single transparent texel sampled until the real ramp arrives
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 0],
        }
    }

    /// Banded chrome gradient, one row
    pub fn builtin() -> Self {
        let pixels = (0..BUILTIN_WIDTH)
            .flat_map(|i| {
                let u = i as f32 / (BUILTIN_WIDTH - 1) as f32;
                let [r, g, b] = chrome_at(u);
                [r, g, b, 255]
            })
            .collect();

        Self {
            width: BUILTIN_WIDTH,
            height: 1,
            pixels,
        }
    }

    /// Decode any image format the `image` crate is built with
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("decoding ramp texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            pixels: img.into_raw(),
        })
    }

    /// Whether both sides are non-zero and within a device's 2D texture limit
    pub fn fits_within(&self, max_dimension: u32) -> bool {
        (1..=max_dimension).contains(&self.width) && (1..=max_dimension).contains(&self.height)
    }

    /// Nearest texel of the bottom row at `u`, clamped to the edges
    pub fn sample(&self, u: f32) -> [u8; 4] {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = self.height - 1;
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

fn chrome_at(u: f32) -> [u8; 3] {
    let upper = CHROME_STOPS
        .iter()
        .position(|(pos, _)| *pos >= u)
        .unwrap_or(CHROME_STOPS.len() - 1)
        .max(1);
    let (p0, c0) = CHROME_STOPS[upper - 1];
    let (p1, c1) = CHROME_STOPS[upper];
    let t = ((u - p0) / (p1 - p0)).clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])]
}

/// Outcome of polling a ramp load
#[derive(Debug)]
pub enum RampPoll {
    /// Nothing in flight
    Idle,
    Pending,
    Ready(RampImage),
    Failed(String),
}

/// Background ramp decode, polled from the render loop without blocking
#[derive(Debug, Default)]
pub struct RampLoader {
    receiver: Option<oneshot::Receiver<anyhow::Result<RampImage>>>,
}

impl RampLoader {
    pub fn spawn(source: RampSource) -> Self {
        let (sender, receiver) = oneshot::channel();
        match source {
            RampSource::Builtin => {
                sender.send(Ok(RampImage::builtin())).ok();
            }
            RampSource::File(path) => {
                debug!("Loading ramp texture from {}", path.display());
                let spawned = std::thread::Builder::new()
                    .name("ramp-loader".into())
                    .spawn(move || {
                        sender.send(RampImage::load(&path)).ok();
                    });
                if let Err(e) = spawned {
                    warn!("Could not start ramp loader thread: {}", e);
                }
            }
        }
        Self {
            receiver: Some(receiver),
        }
    }

    pub fn poll(&mut self) -> RampPoll {
        let Some(receiver) = self.receiver.as_mut() else {
            return RampPoll::Idle;
        };

        match receiver.try_recv() {
            Ok(None) => RampPoll::Pending,
            Ok(Some(result)) => {
                self.receiver = None;
                match result {
                    Ok(image) => RampPoll::Ready(image),
                    Err(e) => RampPoll::Failed(format!("{e:#}")),
                }
            }
            Err(oneshot::Canceled) => {
                self.receiver = None;
                RampPoll::Failed("ramp loader exited without a result".into())
            }
        }
    }

    /// Block until the load settles; for tools and tests
    pub fn wait(&mut self) -> RampPoll {
        match self.receiver.take() {
            None => RampPoll::Idle,
            Some(receiver) => match futures::executor::block_on(receiver) {
                Ok(Ok(image)) => RampPoll::Ready(image),
                Ok(Err(e)) => RampPoll::Failed(format!("{e:#}")),
                Err(oneshot::Canceled) => {
                    RampPoll::Failed("ramp loader exited without a result".into())
                }
            },
        }
    }
}
