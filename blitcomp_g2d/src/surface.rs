// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffer to engine-surface translation.
//!
//! [`derive_surface`] is the only place that knows how a buffer's pixel
//! format maps onto engine planes. Its result depends only on the buffer, the
//! rectangle and what the helper library answers, so it is recomputed for
//! every clear and blit rather than cached.

use blitcomp_core::buffer::{Buffer, PixelFormat};
use blitcomp_core::engine::{EntryPoints, GpuHelper, HwFormat, Surface, Tiling};
use blitcomp_core::geometry::Rect;

/// Alignment, in pixels, of the chroma row pitch of planar 4:2:0 buffers.
pub const CHROMA_STRIDE_ALIGN: u32 = 16;

/// Row pitch of each chroma plane of a planar 4:2:0 buffer with luma pitch
/// `stride`.
#[inline]
#[must_use]
pub const fn chroma_stride(stride: u32) -> u32 {
    (stride / 2).next_multiple_of(CHROMA_STRIDE_ALIGN)
}

/// Maps an abstract pixel format to the engine's format.
///
/// Formats without an engine counterpart log an error and fall back to
/// [`HwFormat::Rgba8888`]. The helper's format hook then gets the final say
/// when it resolved.
pub fn hardware_format<H: GpuHelper + ?Sized>(helper: &mut H, buffer: &Buffer) -> HwFormat {
    let format = match buffer.format {
        PixelFormat::Rgba8888 => HwFormat::Rgba8888,
        PixelFormat::Rgbx8888 => HwFormat::Rgbx8888,
        PixelFormat::Rgb565 => HwFormat::Rgb565,
        PixelFormat::Bgra8888 => HwFormat::Bgra8888,
        PixelFormat::Nv21 => HwFormat::Nv21,
        PixelFormat::Nv12 => HwFormat::Nv12,
        PixelFormat::I420 => HwFormat::I420,
        PixelFormat::Yv12 => HwFormat::Yv12,
        PixelFormat::Nv16 => HwFormat::Nv16,
        PixelFormat::Yuyv => HwFormat::Yuyv,
        PixelFormat::Other(raw) => {
            log::error!("unsupported pixel format {raw:#x}, treating as RGBA8888");
            HwFormat::Rgba8888
        }
    };
    if helper.entry_points().contains(EntryPoints::ALTER_FORMAT) {
        helper.alter_format(buffer, format)
    } else {
        format
    }
}

/// Builds the engine surface for operating on `rect` of `buffer`.
///
/// Helper queries that are missing or fail fall back to the buffer's own
/// height, linear tiling and a zero flip offset.
pub fn derive_surface<H: GpuHelper + ?Sized>(
    helper: &mut H,
    buffer: &Buffer,
    rect: Rect,
) -> Surface {
    let entry_points = helper.entry_points();

    let aligned_height = if entry_points.contains(EntryPoints::ALIGNED_SIZE) {
        helper
            .aligned_size(buffer)
            .map_or(buffer.height, |(_, height)| height)
    } else {
        buffer.height
    };
    let tiling = if entry_points.contains(EntryPoints::TILING) {
        helper.tiling(buffer).unwrap_or(Tiling::Linear)
    } else {
        Tiling::Linear
    };
    let flip_offset = if entry_points.contains(EntryPoints::FLIP_OFFSET) {
        helper.flip_offset(buffer).unwrap_or(0)
    } else {
        0
    };

    let format = hardware_format(helper, buffer);
    let stride = buffer.stride;
    let luma = u64::from(stride);

    let mut planes = [buffer.phys.wrapping_add(flip_offset), 0, 0];
    match format {
        HwFormat::Rgb565
        | HwFormat::Yuyv
        | HwFormat::Rgba8888
        | HwFormat::Bgra8888
        | HwFormat::Rgbx8888
        | HwFormat::Bgrx8888 => {}
        HwFormat::Nv16 | HwFormat::Nv12 | HwFormat::Nv21 => {
            planes[1] = planes[0].wrapping_add(luma * u64::from(aligned_height));
        }
        HwFormat::I420 | HwFormat::Yv12 => {
            let luma_size = luma * u64::from(buffer.height);
            let chroma_size = u64::from(chroma_stride(stride)) * u64::from(buffer.height) / 2;
            if format == HwFormat::I420 {
                planes[1] = planes[0].wrapping_add(luma_size);
                planes[2] = planes[1].wrapping_add(chroma_size);
            } else {
                planes[2] = planes[0].wrapping_add(luma_size);
                planes[1] = planes[2].wrapping_add(chroma_size);
            }
        }
        other => {
            log::info!("no plane layout for {other:?}, using plane 0 only");
        }
    }

    let mut surface = Surface {
        format,
        planes,
        stride,
        width: buffer.width,
        height: buffer.height,
        tiling,
        ..Surface::default()
    };
    surface.set_rect(rect);
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use blitcomp_core::buffer::{BufferId, Usage};
    use blitcomp_core::engine::Unavailable;
    use blitcomp_core::error::NativeError;

    fn buffer(format: PixelFormat) -> Buffer {
        Buffer {
            id: BufferId(3),
            width: 1280,
            height: 720,
            stride: 1280,
            format,
            native_format: 0,
            phys: 0x1000_0000,
            usage: Usage::TEXTURE,
        }
    }

    /// Helper answering every query with fixed values.
    #[derive(Debug)]
    struct Fixed {
        aligned_height: u32,
        offset: u64,
        tiling: Tiling,
        alter: Option<HwFormat>,
    }

    impl GpuHelper for Fixed {
        fn entry_points(&self) -> EntryPoints {
            EntryPoints::HELPER
        }

        fn aligned_size(&mut self, buffer: &Buffer) -> Result<(u32, u32), NativeError> {
            Ok((buffer.stride, self.aligned_height))
        }

        fn flip_offset(&mut self, _: &Buffer) -> Result<u64, NativeError> {
            Ok(self.offset)
        }

        fn tiling(&mut self, _: &Buffer) -> Result<Tiling, NativeError> {
            Ok(self.tiling)
        }

        fn alter_format(&mut self, _: &Buffer, format: HwFormat) -> HwFormat {
            self.alter.unwrap_or(format)
        }
    }

    /// Helper claiming every entry point but failing each query.
    #[derive(Debug)]
    struct Failing;

    impl GpuHelper for Failing {
        fn entry_points(&self) -> EntryPoints {
            EntryPoints::HELPER
        }
    }

    #[test]
    fn chroma_stride_rounds_up() {
        assert_eq!(chroma_stride(1280), 640);
        assert_eq!(chroma_stride(1000), 512);
        assert_eq!(chroma_stride(2), 16);
        assert_eq!(chroma_stride(0), 0);
    }

    #[test]
    fn packed_format_uses_one_plane() {
        let rect = Rect::new(10, 20, 110, 220);
        let s = derive_surface(&mut Unavailable, &buffer(PixelFormat::Rgbx8888), rect);
        assert_eq!(s.format, HwFormat::Rgbx8888);
        assert_eq!(s.planes, [0x1000_0000, 0, 0]);
        assert_eq!(s.rect(), rect);
        assert_eq!((s.width, s.height, s.stride), (1280, 720, 1280));
        assert_eq!(s.tiling, Tiling::Linear);
    }

    #[test]
    fn plane_addresses_wrap_like_the_base() {
        let mut b = buffer(PixelFormat::I420);
        b.phys = u64::MAX - 0xff;
        let s = derive_surface(&mut Unavailable, &b, Rect::EMPTY);
        let luma_size = 1280 * 720;
        assert_eq!(s.planes[0], u64::MAX - 0xff);
        assert_eq!(s.planes[1], (u64::MAX - 0xff).wrapping_add(luma_size));
        assert_eq!(s.planes[2], s.planes[1] + 640 * 360);
    }

    #[test]
    fn semi_planar_uses_aligned_height() {
        let mut helper = Fixed {
            aligned_height: 736,
            offset: 0,
            tiling: Tiling::Tiled,
            alter: None,
        };
        let s = derive_surface(&mut helper, &buffer(PixelFormat::Nv12), Rect::EMPTY);
        assert_eq!(s.planes[1], 0x1000_0000 + 1280 * 736);
        assert_eq!(s.planes[2], 0);
        assert_eq!(s.tiling, Tiling::Tiled);
    }

    #[test]
    fn i420_orders_u_before_v() {
        let s = derive_surface(&mut Unavailable, &buffer(PixelFormat::I420), Rect::EMPTY);
        let y = 0x1000_0000_u64;
        assert_eq!(s.planes[1], y + 1280 * 720);
        assert_eq!(s.planes[2], s.planes[1] + 640 * 360);
    }

    #[test]
    fn yv12_orders_v_before_u() {
        let s = derive_surface(&mut Unavailable, &buffer(PixelFormat::Yv12), Rect::EMPTY);
        let y = 0x1000_0000_u64;
        assert_eq!(s.planes[2], y + 1280 * 720);
        assert_eq!(s.planes[1], s.planes[2] + 640 * 360);
    }

    #[test]
    fn flip_offset_moves_every_plane() {
        let mut helper = Fixed {
            aligned_height: 720,
            offset: 0x10_0000,
            tiling: Tiling::Linear,
            alter: None,
        };
        let plain = derive_surface(&mut Unavailable, &buffer(PixelFormat::Nv21), Rect::EMPTY);
        let flipped = derive_surface(&mut helper, &buffer(PixelFormat::Nv21), Rect::EMPTY);
        assert_eq!(flipped.planes[0] - plain.planes[0], 0x10_0000);
        assert_eq!(flipped.planes[1] - plain.planes[1], 0x10_0000);
    }

    #[test]
    fn failing_queries_fall_back() {
        let s = derive_surface(&mut Failing, &buffer(PixelFormat::Nv16), Rect::EMPTY);
        assert_eq!(s.planes[0], 0x1000_0000);
        assert_eq!(s.planes[1], 0x1000_0000 + 1280 * 720);
        assert_eq!(s.tiling, Tiling::Linear);
    }

    #[test]
    fn unknown_format_falls_back_to_rgba() {
        let s = derive_surface(&mut Unavailable, &buffer(PixelFormat::Other(0x7fff)), Rect::EMPTY);
        assert_eq!(s.format, HwFormat::Rgba8888);
    }

    #[test]
    fn alter_format_hook_wins() {
        let mut helper = Fixed {
            aligned_height: 720,
            offset: 0,
            tiling: Tiling::Linear,
            alter: Some(HwFormat::Nv61),
        };
        let s = derive_surface(&mut helper, &buffer(PixelFormat::Nv16), Rect::EMPTY);
        assert_eq!(s.format, HwFormat::Nv61);
        assert_eq!(s.planes[1], 0, "no plane layout is known for NV61");
    }

    #[test]
    fn derivation_is_repeatable() {
        let mut helper = Fixed {
            aligned_height: 768,
            offset: 0x400,
            tiling: Tiling::SuperTiled,
            alter: None,
        };
        let b = buffer(PixelFormat::I420);
        let rect = Rect::new(0, 0, 64, 64);
        let first = derive_surface(&mut helper, &b, rect);
        let second = derive_surface(&mut helper, &b, rect);
        assert_eq!(first, second);
    }
}
