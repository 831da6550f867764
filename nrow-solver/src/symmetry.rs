//! Symmetries of the 4x4 board on packed positions.
//!
//! Each primitive is a fixed bit permutation of a 16-bit half; both halves of
//! the `u32` go through the same permutation, so the two players' marks stay
//! aligned and the outcome of the position is unchanged.
//!
//! ```text
//!    0  1  2  3
//!    4  5  6  7
//!    8  9 10 11
//!   12 13 14 15
//! ```

/// Low byte of each half (rows 0-1).
const LOW_ROWS: u32 = 0x00FF_00FF;
/// Even rows of each half.
const EVEN_ROWS: u32 = 0x0F0F_0F0F;
/// Columns 0-1 of every row.
const LOW_COLS: u32 = 0x3333_3333;
/// Even columns of every row.
const EVEN_COLS: u32 = 0x5555_5555;

/// Cells 1, 6, 11: swapped with 4, 9, 14.
const TRANSPOSE_3: u32 = 0x0842_0842;
/// Cells 2, 7: swapped with 8, 13.
const TRANSPOSE_6: u32 = 0x0084_0084;
/// Cell 3: swapped with 12.
const TRANSPOSE_9: u32 = 0x0008_0008;

/// Swap the bits selected by `mask` with the bits `delta` positions above.
#[inline]
fn delta_swap(x: u32, mask: u32, delta: u32) -> u32 {
    let t = ((x >> delta) ^ x) & mask;
    x ^ t ^ (t << delta)
}

/// Reverse the order of the rows: (r, c) -> (3 - r, c).
#[inline]
pub fn reverse_rows(x: u32) -> u32 {
    let x = ((x & LOW_ROWS) << 8) | ((x >> 8) & LOW_ROWS);
    ((x & EVEN_ROWS) << 4) | ((x >> 4) & EVEN_ROWS)
}

/// Reverse the order of the columns: (r, c) -> (r, 3 - c).
#[inline]
pub fn reverse_cols(x: u32) -> u32 {
    let x = ((x & LOW_COLS) << 2) | ((x >> 2) & LOW_COLS);
    ((x & EVEN_COLS) << 1) | ((x >> 1) & EVEN_COLS)
}

/// Exchange rows and columns: (r, c) -> (c, r). The main diagonal stays put.
#[inline]
pub fn transpose(x: u32) -> u32 {
    let x = delta_swap(x, TRANSPOSE_3, 3);
    let x = delta_swap(x, TRANSPOSE_6, 6);
    delta_swap(x, TRANSPOSE_9, 9)
}

/// All 8 images of a packed 4x4 position under the dihedral group.
///
/// Order: identity, T, R, R∘T, C, C∘T, C∘R, C∘R∘T (T = transpose,
/// R = row reversal, C = column reversal).
pub fn images(x: u32) -> [u32; 8] {
    let t = transpose(x);
    let r = reverse_rows(x);
    let rt = reverse_rows(t);
    [
        x,
        t,
        r,
        rt,
        reverse_cols(x),
        reverse_cols(t),
        reverse_cols(r),
        reverse_cols(rt),
    ]
}

/// Smallest image; equal for every member of a symmetry class.
pub fn canonical(x: u32) -> u32 {
    images(x).into_iter().min().unwrap_or(x)
}
