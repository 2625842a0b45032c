use crate::error::{EvonetError, Result};
use crate::types::Scalar;

/// Backing memory of a [`Buffer`]
#[derive(Debug)]
pub enum Storage<'a> {
    Owned(Vec<Scalar>),
    /// Caller-managed memory. Never reallocated, never outlives `'a`.
    Borrowed(&'a mut [Scalar]),
}

/// Row-major 2-D container of scalars.
///
/// A buffer either owns its data or is a view over memory that somebody else
/// allocated. Views are how the forward pass reuses its two scratch regions
/// without touching the heap; cloning a view always yields an owning buffer.
#[derive(Debug)]
pub struct Buffer<'a> {
    storage: Storage<'a>,
    rows: usize,
    cols: usize,
}

impl Buffer<'static> {
    /// Zero-filled owning buffer
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            storage: Storage::Owned(vec![0.0; rows * cols]),
            rows,
            cols,
        }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<Scalar>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(EvonetError::length(rows * cols, data.len()));
        }
        Ok(Self {
            storage: Storage::Owned(data),
            rows,
            cols,
        })
    }

    pub fn empty() -> Self {
        Self::zeros(0, 0)
    }
}

impl<'a> Buffer<'a> {
    /// Wrap caller-provided memory without copying it.
    pub fn view(rows: usize, cols: usize, data: &'a mut [Scalar]) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(EvonetError::length(rows * cols, data.len()));
        }
        Ok(Self {
            storage: Storage::Borrowed(data),
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_view(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    pub fn as_slice(&self) -> &[Scalar] {
        match &self.storage {
            Storage::Owned(data) => data.as_slice(),
            Storage::Borrowed(data) => &**data,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        match &mut self.storage {
            Storage::Owned(data) => data.as_mut_slice(),
            Storage::Borrowed(data) => &mut **data,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Scalar {
        debug_assert!(row < self.rows && col < self.cols);
        self.as_slice()[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Scalar) {
        debug_assert!(row < self.rows && col < self.cols);
        let cols = self.cols;
        self.as_mut_slice()[row * cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[Scalar] {
        let start = row * self.cols;
        &self.as_slice()[start..start + self.cols]
    }

    pub fn fill(&mut self, value: Scalar) {
        self.as_mut_slice().fill(value);
    }

    /// Move the contents out, leaving an empty owning buffer behind.
    pub fn take(&mut self) -> Buffer<'a> {
        std::mem::replace(self, Buffer::empty())
    }

    /// Element-wise `self += other`
    pub fn add_assign(&mut self, other: &Buffer<'_>) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(EvonetError::shape(self.shape(), other.shape()));
        }
        for (dst, src) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *dst += *src;
        }
        Ok(())
    }

    pub fn apply<F: FnMut(Scalar) -> Scalar>(&mut self, mut f: F) {
        for x in self.as_mut_slice() {
            *x = f(*x);
        }
    }

    /// Bulk copy from a contiguous source of exactly `len()` elements.
    pub fn load_from(&mut self, src: &[Scalar]) -> Result<()> {
        if src.len() != self.len() {
            return Err(EvonetError::length(self.len(), src.len()));
        }
        self.as_mut_slice().copy_from_slice(src);
        Ok(())
    }

    pub fn to_owned_buffer(&self) -> Buffer<'static> {
        Buffer {
            storage: Storage::Owned(self.as_slice().to_vec()),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl Clone for Buffer<'_> {
    fn clone(&self) -> Self {
        Buffer {
            storage: Storage::Owned(self.as_slice().to_vec()),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl PartialEq for Buffer<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

/// Row vector times matrix: `out = vec · mat`.
///
/// `vec` has `mat.rows()` elements, `out` holds `mat.cols()` elements.
pub fn vec_mul_mat(out: &mut Buffer<'_>, vec: &[Scalar], mat: &Buffer<'_>) -> Result<()> {
    if vec.len() != mat.rows() {
        return Err(EvonetError::shape((1, mat.rows()), (1, vec.len())));
    }
    if out.len() != mat.cols() {
        return Err(EvonetError::shape((1, mat.cols()), out.shape()));
    }

    let dst = out.as_mut_slice();
    dst.fill(0.0);
    for (j, &x) in vec.iter().enumerate() {
        for (o, &w) in dst.iter_mut().zip(mat.row(j)) {
            *o += x * w;
        }
    }
    Ok(())
}
