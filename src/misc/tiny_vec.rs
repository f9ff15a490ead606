use std::{fmt::Debug, hash::Hash, mem::MaybeUninit, ops::Deref};

/// Inline vector with a fixed capacity for `Copy` values.
#[derive(Clone, Copy)]
pub struct TinyVec<T, const N: usize>
where
    T: Copy,
{
    buf: [MaybeUninit<T>; N],
    len: u8,
}

impl<T, const N: usize> TinyVec<T, N>
where
    T: Copy
{
    pub const fn new() -> Self {
        const { assert!(N <= 255, "TinyVec supports up to 255 elements") }
        TinyVec { buf: [const { MaybeUninit::uninit() }; N], len: 0 }
    }

    /// Panics when the vector is full.
    pub fn push(&mut self, val: T) {
        assert!((self.len as usize) < N, "TinyVec is full");
        self.buf[self.len as usize].write(val);
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 { return None; }
        self.len -= 1;
        // SAFETY: previously pushed, so initialized
        Some(unsafe { self.buf[self.len as usize].assume_init_read() })
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Copy, const N: usize> Default for TinyVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> Deref for TinyVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Only the first `self.len` elements are initialized
        unsafe {
            std::slice::from_raw_parts(self.buf.as_ptr() as *const T, self.len as usize)
        }
    }
}

impl<T: Copy + PartialEq, const N: usize> PartialEq for TinyVec<T, N> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Copy + Eq, const N: usize> Eq for TinyVec<T, N> {}

impl<T: Copy + Hash, const N: usize> Hash for TinyVec<T, N> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (**self).hash(state)
    }
}

impl<T: Copy + Debug, const N: usize> Debug for TinyVec<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut v: TinyVec<u8, 4> = TinyVec::new();
        assert!(v.is_empty());
        v.push(3);
        v.push(5);
        assert_eq!(&*v, &[3, 5]);
        assert_eq!(v.pop(), Some(5));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_equality_ignores_unused_slots() {
        let mut a: TinyVec<u8, 4> = TinyVec::new();
        let mut b: TinyVec<u8, 4> = TinyVec::new();
        a.push(1);
        a.push(2);
        a.pop();
        b.push(1);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "TinyVec is full")]
    fn test_push_past_capacity_panics() {
        let mut v: TinyVec<u8, 1> = TinyVec::new();
        v.push(1);
        v.push(2);
    }
}
