use std::{fs::File, iter};

use indicatif::ProgressIterator;
use log::{debug, info};

use crate::scene::camera::CameraInput;

use super::{canvas::Canvas, depth_buffer::DepthBuffer, renderer::Renderer};

/// Hold `input` for `frames` consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightStep {
    pub frames: usize,
    pub input: CameraInput,
}

impl FlightStep {
    pub fn new(frames: usize, input: CameraInput) -> Self {
        Self { frames, input }
    }
}

/// Renders a scripted camera flight. The first frame shows the camera as configured,
/// every following frame applies one step of input before rendering.
pub struct Animator {
    renderer: Renderer,
    flight: Vec<FlightStep>,
    framerate: u32,
}

impl Animator {
    pub const DEFAULT_FRAMERATE: u32 = 25;

    pub fn new(renderer: Renderer, flight: Vec<FlightStep>, framerate: u32) -> Option<Self> {
        if framerate == 0 {
            return None;
        }
        Some(Self {
            renderer,
            flight,
            framerate,
        })
    }

    pub fn frame_count(&self) -> usize {
        1 + self.flight.iter().map(|step| step.frames).sum::<usize>()
    }

    /// Delay between frames in the gif's units of 10 ms.
    fn frame_delay(&self) -> u16 {
        (100. / self.framerate as f64).round().max(1.) as u16
    }

    fn inputs(&self) -> impl Iterator<Item = CameraInput> + '_ {
        iter::once(CameraInput::none()).chain(
            self.flight
                .iter()
                .flat_map(|step| iter::repeat_n(step.input, step.frames)),
        )
    }

    fn render_animation<F>(&self, mut encode_fun: F) -> Result<(), String>
    where
        F: FnMut(&Canvas) -> Result<(), String>,
    {
        let bar = indicatif::ProgressBar::new(self.frame_count() as u64).with_style(
            indicatif::ProgressStyle::with_template(
                "[{elapsed_precise}] {wide_bar:.cyan/blue} rendering frame: {human_pos}/{human_len} {percent}% ({eta})",
            )
            .map_err(|e| e.to_string())?,
        );
        info!("rendering {} frames", self.frame_count());

        let mut renderer = self.renderer.clone();
        let settings = renderer.settings();
        let mut canvas = Canvas::new(settings.width(), settings.height());
        let mut depth = DepthBuffer::new(settings.width(), settings.height());

        for (id, input) in self.inputs().enumerate().progress_with(bar) {
            renderer.camera_mut().update(&input);
            let stats = renderer.render_into(&mut canvas, &mut depth);
            debug!("frame {id}: {} visible polygons", stats.visible);
            encode_fun(&canvas)?;
        }
        Ok(())
    }

    pub fn render_frames(&self) -> Result<Vec<Canvas>, String> {
        let mut frames = Vec::with_capacity(self.frame_count());
        self.render_animation(|canvas| {
            frames.push(canvas.clone());
            Ok(())
        })?;
        Ok(frames)
    }

    pub fn render_to_gif(&self, mut file: File) -> Result<(), String> {
        let settings = self.renderer.settings();
        let (width, height) = (settings.width(), settings.height());
        if width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(format!("{width}x{height} is too large for a gif"));
        }

        let mut encoder = gif::Encoder::new(&mut file, width as u16, height as u16, &[])
            .map_err(|e| format!("failed to start gif: {e}"))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| format!("failed to start gif: {e}"))?;

        let delay = self.frame_delay();
        self.render_animation(|canvas| {
            let mut frame = gif::Frame::from(canvas);
            frame.delay = delay;
            encoder
                .write_frame(&frame)
                .map_err(|e| format!("failed to write gif frame: {e}"))
        })
    }
}
