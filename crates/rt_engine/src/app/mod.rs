use std::time::{Duration, Instant};

use winit::dpi::PhysicalSize;
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::error::StartupError;

pub mod input;
pub type WinitWindow = Window;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings
{
    pub title: String,
    pub width: u32,
    pub height: u32
}

/// Creates the window, builds the app, and hands the event loop over to it.
/// Only returns when startup fails.
pub fn run<T>(settings: &WindowSettings, config: T::Config) -> Result<(), StartupError>
    where T : App + 'static
{
    let (event_loop, window) = get_window(settings)?;

    let mut app = T::new(&event_loop, window, config)?;

    event_loop.run(move |event, _, control_flow| {
        app.on_event(event, control_flow)
    });
}

pub trait App : Sized
{
    type Config;

    fn new<T>(event_loop: &EventLoop<T>, window: Window, config: Self::Config) -> Result<Self, StartupError>
        where T : 'static;
    fn on_event<'a, T>(&mut self, event: Event<'a, T>, control_flow: &mut ControlFlow);
}

fn get_window(settings: &WindowSettings) -> Result<(EventLoop<()>, WinitWindow), StartupError>
{
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(settings.title.as_str())
        .with_inner_size(PhysicalSize::new(settings.width.max(1), settings.height.max(1)))
        .build(&event_loop)?;

    Ok((event_loop, window))
}

/// Keeps the redraw rate at or below a target frame rate.
#[derive(Debug, Clone)]
pub struct FrameLimiter
{
    min_frame_time: Option<Duration>,
    last_frame: Option<Instant>
}

impl FrameLimiter
{
    /// `None` or zero leaves the frame rate uncapped.
    pub fn new(max_fps: Option<u32>) -> Self
    {
        let min_frame_time = max_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64));

        Self
        {
            min_frame_time,
            last_frame: None
        }
    }

    pub fn min_frame_time(&self) -> Option<Duration> { self.min_frame_time }

    /// Earliest instant the next frame may start, `None` when it may start right away.
    pub fn next_frame_at(&self) -> Option<Instant>
    {
        match (self.min_frame_time, self.last_frame)
        {
            (Some(min), Some(last)) => Some(last + min),
            _ => None
        }
    }

    pub fn should_render(&self, now: Instant) -> bool
    {
        self.next_frame_at().map_or(true, |next| now >= next)
    }

    pub fn mark_frame(&mut self, now: Instant)
    {
        self.last_frame = Some(now);
    }

    /// Requests a redraw when the limiter allows it, otherwise sleeps the loop until it does.
    pub fn schedule(&self, window: &Window, control_flow: &mut ControlFlow)
    {
        if self.should_render(Instant::now())
        {
            *control_flow = ControlFlow::Poll;
            window.request_redraw();
        }
        else if let Some(next) = self.next_frame_at()
        {
            *control_flow = ControlFlow::WaitUntil(next);
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn uncapped_limiter_always_renders()
    {
        let mut limiter = FrameLimiter::new(None);
        let now = Instant::now();
        limiter.mark_frame(now);
        assert!(limiter.should_render(now));
        assert_eq!(FrameLimiter::new(Some(0)).min_frame_time(), None);
    }

    #[test]
    fn capped_limiter_waits_for_frame_time()
    {
        let mut limiter = FrameLimiter::new(Some(600));
        let start = Instant::now();
        assert!(limiter.should_render(start));

        limiter.mark_frame(start);
        let frame_time = limiter.min_frame_time().unwrap();
        assert!(!limiter.should_render(start + frame_time / 2));
        assert!(limiter.should_render(start + frame_time));
        assert_eq!(limiter.next_frame_at(), Some(start + frame_time));
    }

    #[test]
    fn frame_time_matches_rate()
    {
        let limiter = FrameLimiter::new(Some(50));
        assert_eq!(limiter.min_frame_time(), Some(Duration::from_millis(20)));
    }
}
