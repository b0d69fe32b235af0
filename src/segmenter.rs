use crate::detection::Blob;
use crate::error::Error;

/// Foreground segmentation of raw frames.
///
/// Implementations own whatever background model they need and return the
/// moving blobs of one frame, already cleaned up.
pub trait Segmenter {
    type Frame;

    /// Width and height of `frame` in pixels.
    fn dims(&self, frame: &Self::Frame) -> Result<(u32, u32), Error>;

    fn segment(&mut self, frame: &Self::Frame) -> Result<Vec<Blob>, Error>;
}

#[cfg(feature = "opencv")]
pub use self::mog2::{Mog2Config, Mog2Segmenter};

#[cfg(feature = "opencv")]
mod mog2 {
    use super::Segmenter;
    use crate::detection::Blob;
    use crate::error::Error;

    use opencv::{
        core::{self, Mat, Ptr, Vector},
        imgproc,
        prelude::*,
        video::{self, BackgroundSubtractorMOG2},
    };

    #[derive(Debug, Clone)]
    pub struct Mog2Config {
        pub history: i32,
        pub var_threshold: f64,
        pub detect_shadows: bool,
        pub blur_kernel: i32,
        pub morph_kernel: i32,
    }

    impl Default for Mog2Config {
        fn default() -> Self {
            Self {
                history: 100,
                var_threshold: 40.0,
                detect_shadows: false,
                blur_kernel: 5,
                morph_kernel: 5,
            }
        }
    }

    /// Gray → blur → MOG2 → open/close → external contours.
    pub struct Mog2Segmenter {
        config: Mog2Config,
        subtractor: Ptr<dyn BackgroundSubtractorMOG2>,
        kernel: Mat,
        gray: Mat,
        blur: Mat,
        mask: Mat,
        cleaned: Mat,
    }

    impl Mog2Segmenter {
        pub fn new(config: Mog2Config) -> Result<Self, Error> {
            let subtractor = video::create_background_subtractor_mog2(
                config.history,
                config.var_threshold,
                config.detect_shadows,
            )?;

            let kernel = imgproc::get_structuring_element(
                imgproc::MORPH_RECT,
                core::Size::new(config.morph_kernel, config.morph_kernel),
                core::Point::new(-1, -1),
            )?;

            Ok(Self {
                config,
                subtractor,
                kernel,
                gray: Mat::default(),
                blur: Mat::default(),
                mask: Mat::default(),
                cleaned: Mat::default(),
            })
        }

        fn morph(&mut self, op: i32) -> Result<(), Error> {
            imgproc::morphology_ex(
                &self.mask,
                &mut self.cleaned,
                op,
                &self.kernel,
                core::Point::new(-1, -1),
                1,
                core::BORDER_CONSTANT,
                imgproc::morphology_default_border_value()?,
            )?;
            std::mem::swap(&mut self.mask, &mut self.cleaned);

            Ok(())
        }
    }

    impl Segmenter for Mog2Segmenter {
        type Frame = Mat;

        fn dims(&self, frame: &Mat) -> Result<(u32, u32), Error> {
            Ok((frame.cols().max(0) as u32, frame.rows().max(0) as u32))
        }

        fn segment(&mut self, frame: &Mat) -> Result<Vec<Blob>, Error> {
            imgproc::cvt_color(frame, &mut self.gray, imgproc::COLOR_BGR2GRAY, 0)?;
            imgproc::gaussian_blur(
                &self.gray,
                &mut self.blur,
                core::Size::new(self.config.blur_kernel, self.config.blur_kernel),
                0.0,
                0.0,
                core::BORDER_DEFAULT,
            )?;

            self.subtractor.apply(&self.blur, &mut self.mask, -1.0)?;

            self.morph(imgproc::MORPH_OPEN)?;
            self.morph(imgproc::MORPH_CLOSE)?;

            let mut contours = Vector::<Vector<core::Point>>::new();
            imgproc::find_contours(
                &self.mask,
                &mut contours,
                imgproc::RETR_EXTERNAL,
                imgproc::CHAIN_APPROX_SIMPLE,
                core::Point::new(0, 0),
            )?;

            let mut blobs = Vec::with_capacity(contours.len());
            for contour in contours.iter() {
                let area = imgproc::contour_area(&contour, false)?;
                let rect = imgproc::bounding_rect(&contour)?;

                blobs.push(Blob::new(
                    rect.x as f32,
                    rect.y as f32,
                    rect.width as f32,
                    rect.height as f32,
                    area as f32,
                ));
            }

            Ok(blobs)
        }
    }
}
