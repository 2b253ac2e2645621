/// Map a possibly out-of-range coordinate into `0..len` by mirroring about the
/// edge pixels without repeating them (`gfedcb|abcdefgh|gfedcba`).
///
/// A length of one maps everything to 0. Panics if `len` is zero.
#[inline]
pub fn reflect_101(coord: isize, len: usize) -> usize {
    assert!(len > 0, "cannot reflect into an empty range");
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    let period = 2 * n - 2;
    let mut c = coord.rem_euclid(period);
    if c >= n {
        c = period - c;
    }
    c as usize
}
