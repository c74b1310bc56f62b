//! Feeding rendered animation frames into a [`Tarball`].
//!
//! Drawing and image encoding belong to the [`Animator`] implementation.
//! This module only walks the timeline, names each frame and hands the
//! encoded bytes to the archive builder in order.
//!
//! ```rust
//! use frametar::frames::{archive_frames, Animator};
//!
//! struct Blink;
//!
//! impl Animator for Blink {
//!     type Error = std::convert::Infallible;
//!     fn width(&self) -> u32 { 1 }
//!     fn height(&self) -> u32 { 1 }
//!     fn fps(&self) -> f64 { 10.0 }
//!     fn duration(&self) -> f64 { 1.0 }
//!     fn render_frame(&mut self, t: f64) -> Result<Vec<u8>, Self::Error> {
//!         Ok(vec![(t * 10.0) as u8])
//!     }
//! }
//!
//! let archive = archive_frames(&mut Blink).unwrap();
//! // ten frames of one padded block each, plus headers and the end marker
//! assert_eq!(archive.len(), 10 * 1024 + 1024);
//! ```

use std::fmt::Display;
use std::iter::FusedIterator;

use log::debug;

use crate::error::{Result, TarError};
use crate::tar::{TarArchive, Tarball};

/// Something that can be rendered frame by frame.
pub trait Animator {
    type Error: Display;

    /// Pixel width of every frame.
    fn width(&self) -> u32;
    /// Pixel height of every frame.
    fn height(&self) -> u32;
    fn fps(&self) -> f64;
    /// Total length in seconds.
    fn duration(&self) -> f64;

    /// One-time preparation (loading sprites, fonts...) run before the first frame.
    fn load(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Draw the frame at `t` seconds and return it as an encoded PNG.
    fn render_frame(&mut self, t: f64) -> std::result::Result<Vec<u8>, Self::Error>;
}

/// Number of frames for a timeline: `floor(fps * duration)`.
pub fn frame_count(fps: f64, duration: f64) -> usize {
    let n = (fps * duration).floor();
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}

/// File name of frame `index` out of `total`, zero-padded to the width of `total`.
///
/// ```rust
/// use frametar::frames::frame_name;
/// assert_eq!(frame_name(7, 120), "007.png");
/// ```
pub fn frame_name(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{:0width$}.png", index, width = width)
}

/// Lazy sequence of `(name, png)` pairs, one per frame. Not restartable.
///
/// Stops after the first error.
pub struct Frames<'a, A: Animator + ?Sized> {
    animator: &'a mut A,
    fps: f64,
    index: usize,
    total: usize,
}

impl<A: Animator + ?Sized> Iterator for Frames<'_, A> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total {
            return None;
        }
        let index = self.index;
        let t = index as f64 / self.fps;
        match self.animator.render_frame(t) {
            Ok(png) => {
                self.index += 1;
                Some(Ok((frame_name(index, self.total), png)))
            }
            Err(e) => {
                self.index = self.total;
                Some(Err(TarError::Render {
                    frame: index,
                    reason: e.to_string(),
                }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.index;
        (0, Some(left))
    }
}

impl<A: Animator + ?Sized> FusedIterator for Frames<'_, A> {}

/// Prepare the animator and return its frames.
pub fn render<A: Animator + ?Sized>(animator: &mut A) -> Result<Frames<'_, A>> {
    animator
        .load()
        .map_err(|e| TarError::Load(e.to_string()))?;
    let fps = animator.fps();
    let total = frame_count(fps, animator.duration());
    debug!(
        "rendering {} frames at {}x{}, {} fps",
        total,
        animator.width(),
        animator.height(),
        fps
    );
    Ok(Frames {
        animator,
        fps,
        index: 0,
        total,
    })
}

/// Add every frame to `tarball` in timeline order. Returns the number of frames added.
///
/// On error the frames added so far stay in `tarball`.
pub fn render_to_tarball<A: Animator + ?Sized>(animator: &mut A, tarball: &mut Tarball) -> Result<usize> {
    let mut added = 0;
    for frame in render(animator)? {
        let (name, png) = frame?;
        tarball.add_file(name, png)?;
        added += 1;
    }
    Ok(added)
}

/// Render every frame into a new archive.
pub fn archive_frames<A: Animator + ?Sized>(animator: &mut A) -> Result<TarArchive> {
    let mut tarball = Tarball::new();
    render_to_tarball(animator, &mut tarball)?;
    tarball.generate()
}

/// Archive any ordered sequence of `(name, content)` pairs.
pub fn archive_pairs<I, N, C>(pairs: I) -> Result<TarArchive>
where
    I: IntoIterator<Item = (N, C)>,
    N: Into<String>,
    C: Into<Vec<u8>>,
{
    let mut tarball = Tarball::new();
    for (name, content) in pairs {
        tarball.add_file(name, content)?;
    }
    tarball.generate()
}
