//! Fixed-width little-endian reads and writes at a caller-supplied offset.
//!
//! These are total functions over an in-bounds byte buffer: callers are
//! expected to have sized the buffer correctly ahead of time (see
//! `bam::record`, whose derived offsets guarantee this). An out-of-bounds
//! offset panics via the ordinary slice-indexing panic, the same as
//! `byteorder`'s own `ByteOrder` methods.

use byteorder::{ByteOrder, LittleEndian};

pub fn read_u8(buf: &[u8], offset: usize) -> u8 {
    buf[offset]
}

pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) {
    buf[offset] = value;
}

pub fn read_i8(buf: &[u8], offset: usize) -> i8 {
    buf[offset] as i8
}

pub fn write_i8(buf: &mut [u8], offset: usize, value: i8) {
    buf[offset] = value as u8;
}

pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
    LittleEndian::read_u16(&buf[offset..offset + 2])
}

pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    LittleEndian::write_u16(&mut buf[offset..offset + 2], value)
}

pub fn read_i16(buf: &[u8], offset: usize) -> i16 {
    LittleEndian::read_i16(&buf[offset..offset + 2])
}

pub fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
    LittleEndian::write_i16(&mut buf[offset..offset + 2], value)
}

pub fn read_u32(buf: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&buf[offset..offset + 4])
}

pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    LittleEndian::write_u32(&mut buf[offset..offset + 4], value)
}

pub fn read_i32(buf: &[u8], offset: usize) -> i32 {
    LittleEndian::read_i32(&buf[offset..offset + 4])
}

pub fn write_i32(buf: &mut [u8], offset: usize, value: i32) {
    LittleEndian::write_i32(&mut buf[offset..offset + 4], value)
}

pub fn read_f32(buf: &[u8], offset: usize) -> f32 {
    LittleEndian::read_f32(&buf[offset..offset + 4])
}

pub fn write_f32(buf: &mut [u8], offset: usize, value: f32) {
    LittleEndian::write_f32(&mut buf[offset..offset + 4], value)
}
