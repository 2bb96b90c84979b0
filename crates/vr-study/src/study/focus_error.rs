//! Focus accuracy scoring
//!
//! Each focus image is a tilted plane; the point participants are asked to
//! focus on sits at a known pixel position. From that position the correct
//! focus distance follows from the plane's fixed tilt.

/// Focus target of each image in source-image pixels (3150 x 3150), ids 1..=20.
const FOCUS_TARGET_PIXELS: [(i32, i32); 20] = [
    (198, 1233),
    (396, 1854),
    (614, 651),
    (819, 1655),
    (1028, 434),
    (1034, 2457),
    (1236, 2887),
    (1243, 824),
    (1444, 447),
    (1448, 2267),
    (1650, 1657),
    (1663, 2677),
    (1868, 2067),
    (1871, 242),
    (2070, 615),
    (2079, 2250),
    (2285, 2683),
    (2496, 1651),
    (2704, 831),
    (2913, 1644),
];

/// A focus target in the 4000 x 4000 plane space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCoord {
    pub x: i32,
    pub y: i32,
}

impl ImageCoord {
    /// Rescale source-image pixels into plane space.
    ///
    /// Integer arithmetic truncates, which the recorded data depends on.
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self {
            x: x * 400 / 315,
            y: y * 400 / 315,
        }
    }

    /// Plane-space focus target of image `id`.
    pub fn for_image(id: u8) -> Option<Self> {
        let index = usize::from(id).checked_sub(1)?;
        FOCUS_TARGET_PIXELS
            .get(index)
            .map(|&(x, y)| Self::from_pixels(x, y))
    }
}

/// Scores a measured focus distance against an image's correct distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusErrorEvaluator {
    center_coordinate: f32,
    center_distance: f32,
    tan: f32,
}

impl Default for FocusErrorEvaluator {
    fn default() -> Self {
        Self::new(4300.0)
    }
}

impl FocusErrorEvaluator {
    /// Plane center in plane-space units
    pub const CENTER_COORDINATE: f32 = 2000.0;
    /// Tilt of the image plane
    pub const TILT_DEGREES: f32 = 10.0;

    pub fn new(center_distance: f32) -> Self {
        Self {
            center_coordinate: Self::CENTER_COORDINATE,
            center_distance,
            tan: Self::TILT_DEGREES.to_radians().tan(),
        }
    }

    /// Correct focus distance for a plane-space coordinate.
    pub fn expected_distance(&self, coord: ImageCoord) -> f32 {
        let x = coord.x as f32;
        let y = coord.y as f32;
        let offset = -(x - self.center_coordinate) * self.tan + (y - self.center_coordinate) * self.tan;
        offset + self.center_distance
    }

    /// Signed error of `measured` against image `image_id`, rounded half to even.
    pub fn error(&self, measured: i32, image_id: u8) -> Option<i32> {
        let coord = ImageCoord::for_image(image_id)?;
        let error = measured as f32 - self.expected_distance(coord);
        Some(error.round_ties_even() as i32)
    }
}
