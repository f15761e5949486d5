// SYNOID Hologram Display Abstraction
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The LED panel driver lives outside this crate. Anything that can set
// pixels on a back buffer, swap on vsync and read the GPIO input word
// can drive the display loop.

pub mod virtual_panel;

pub use virtual_panel::{SpinConfig, VirtualPanel};

use crate::engine::Pixel;

pub trait Panel {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Write one pixel to the back buffer. Out-of-range writes are ignored.
    fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel);

    /// Blank the back buffer.
    fn clear(&mut self);

    /// Present the back buffer on the next vertical sync. With
    /// `multiple > 1` only every Nth refresh is used.
    fn swap_on_vsync(&mut self, multiple: u32);

    /// Raw GPIO input word.
    fn read_inputs(&mut self) -> u32;

    /// Free-running microsecond counter; wraps at `u32::MAX`.
    fn micros(&self) -> u32;
}

impl<P: Panel + ?Sized> Panel for Box<P> {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        (**self).set_pixel(x, y, pixel)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn swap_on_vsync(&mut self, multiple: u32) {
        (**self).swap_on_vsync(multiple)
    }

    fn read_inputs(&mut self) -> u32 {
        (**self).read_inputs()
    }

    fn micros(&self) -> u32 {
        (**self).micros()
    }
}
