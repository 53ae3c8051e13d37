//! A sample host module compiled together with its generated stub.
//!
//! `build.rs` runs the generator over `fixtures/geometry.json` and [`stub`] includes the result verbatim, so the
//! crate only builds if the generator's output compiles against [`geometry`] and `cabind_runtime`. The tests in
//! `tests/` then call the exported wrappers the way a foreign caller would.

/// Host module the stub binds.
#[allow(non_snake_case, dead_code)]
pub mod geometry {
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static RESETS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Point {
        pub X: f64,
        pub Y: f64,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Segment {
        pub Start: Point,
        pub(crate) cache: Cell<f64>,
        pub End: Point,
    }

    pub fn Reset() {
        RESETS.fetch_add(1, Ordering::SeqCst);
    }

    /// How many times `Reset` ran.
    pub fn resets() -> usize {
        RESETS.load(Ordering::SeqCst)
    }

    pub fn Translate(p: Point, dx: f64, dy: f64) -> Point {
        Point {
            X: p.X + dx,
            Y: p.Y + dy,
        }
    }

    pub fn Bounds(p: Point) -> (f64, Point) {
        (p.X.abs().max(p.Y.abs()), Point { X: -p.X, Y: -p.Y })
    }
}

/// Generator output for `fixtures/geometry.json`.
#[allow(
    non_snake_case,
    non_camel_case_types,
    dead_code,
    improper_ctypes_definitions,
    clippy::missing_safety_doc
)]
pub mod stub {
    include!(concat!(env!("OUT_DIR"), "/geometry_stub.rs"));
}

/// Text of [`stub`].
pub const STUB_SOURCE: &str = include_str!(concat!(env!("OUT_DIR"), "/geometry_stub.rs"));
