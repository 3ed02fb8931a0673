//! Numeric buffers crossing the FFI boundary.
//!
//! Two directions exist and their ownership rules differ:
//!
//! - **SDK-owned** buffers (frames returned by acquisition calls) are wrapped
//!   in [`NativeOwned`]. Their contents are copied into an `ndarray` array and
//!   the native buffer is then released exactly once by its matching destroy
//!   call, also on error paths.
//! - **Host-owned** buffers are wrapped in [`HostView`]. The view owns a
//!   contiguous row-major array and a descriptor pointing into it, so the
//!   memory outlives every use of the descriptor. The SDK never frees it.

use crate::error::RadarError;
use crate::loader::RadarApi;
use crate::sys::{BufferFlags, CubeC, CubeR, MatrixC, MatrixR, PackedStride, RawComplex, VectorC, VectorR};
use crate::Result;
use ndarray::{Array, ArrayBase, ArrayViewMut, Data, Dimension, Ix1, Ix2, Ix3};
use num_complex::Complex32;
use std::ptr::NonNull;

/// Element type of a native buffer.
pub trait Element: Copy + 'static {
    /// In-memory representation on the native side.
    type Raw: Copy;

    fn from_raw(raw: Self::Raw) -> Self;
}

impl Element for f32 {
    type Raw = f32;

    fn from_raw(raw: f32) -> Self {
        raw
    }
}

impl Element for Complex32 {
    type Raw = RawComplex;

    fn from_raw([re, im]: RawComplex) -> Self {
        Complex32::new(re, im)
    }
}

// Host complex arrays are handed to the SDK without conversion.
const _: () = assert!(std::mem::size_of::<Complex32>() == std::mem::size_of::<RawComplex>());
const _: () = assert!(std::mem::align_of::<Complex32>() == std::mem::align_of::<RawComplex>());

/// A native vector / matrix / cube descriptor.
pub trait NativeBuffer: Sized {
    type Elem: Element;
    type Dim: Dimension;

    /// Extents in host axis order.
    fn shape(&self) -> Self::Dim;

    /// Element offset of `index` from the data pointer, per the declared strides.
    fn offset(&self, index: <Self::Dim as Dimension>::Pattern) -> usize;

    fn data(&self) -> *mut <Self::Elem as Element>::Raw;

    fn set_data(&mut self, data: *mut <Self::Elem as Element>::Raw);

    fn owns_data(&self) -> bool;

    /// Descriptor over contiguous row-major host memory, not owned by the SDK.
    fn describe_host(data: *mut <Self::Elem as Element>::Raw, shape: &Self::Dim) -> Result<Self>;

    /// The SDK call that releases a buffer of this type.
    fn destructor(api: &RadarApi) -> unsafe extern "C" fn(*mut Self);
}

fn extent(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| RadarError::Shape(format!("extent {n} does not fit in 32 bits")))
}

macro_rules! vector_buffer {
    ($ty:ty, $elem:ty, $destroy:ident) => {
        impl NativeBuffer for $ty {
            type Elem = $elem;
            type Dim = Ix1;

            fn shape(&self) -> Ix1 {
                Ix1(self.len as usize)
            }

            fn offset(&self, i: usize) -> usize {
                i * self.packed.stride() as usize
            }

            fn data(&self) -> *mut <$elem as Element>::Raw {
                self.d
            }

            fn set_data(&mut self, data: *mut <$elem as Element>::Raw) {
                self.d = data;
            }

            fn owns_data(&self) -> bool {
                self.packed.owns_data()
            }

            fn describe_host(data: *mut <$elem as Element>::Raw, shape: &Ix1) -> Result<Self> {
                Ok(Self {
                    d: data,
                    len: extent(shape[0])?,
                    packed: PackedStride::from_bits(1),
                })
            }

            fn destructor(api: &RadarApi) -> unsafe extern "C" fn(*mut Self) {
                api.$destroy
            }
        }
    };
}

macro_rules! matrix_buffer {
    ($ty:ty, $elem:ty, $destroy:ident) => {
        impl NativeBuffer for $ty {
            type Elem = $elem;
            type Dim = Ix2;

            fn shape(&self) -> Ix2 {
                Ix2(self.rows as usize, self.cols as usize)
            }

            fn offset(&self, (r, c): (usize, usize)) -> usize {
                r * self.stride[1] as usize + c * self.stride[0] as usize
            }

            fn data(&self) -> *mut <$elem as Element>::Raw {
                self.d
            }

            fn set_data(&mut self, data: *mut <$elem as Element>::Raw) {
                self.d = data;
            }

            fn owns_data(&self) -> bool {
                self.flags.contains(BufferFlags::OWNS_DATA)
            }

            fn describe_host(data: *mut <$elem as Element>::Raw, shape: &Ix2) -> Result<Self> {
                let cols = extent(shape[1])?;
                Ok(Self {
                    d: data,
                    rows: extent(shape[0])?,
                    cols,
                    stride: [1, cols],
                    flags: BufferFlags::empty(),
                })
            }

            fn destructor(api: &RadarApi) -> unsafe extern "C" fn(*mut Self) {
                api.$destroy
            }
        }
    };
}

macro_rules! cube_buffer {
    ($ty:ty, $elem:ty, $destroy:ident) => {
        impl NativeBuffer for $ty {
            type Elem = $elem;
            type Dim = Ix3;

            fn shape(&self) -> Ix3 {
                Ix3(self.rows as usize, self.cols as usize, self.slices as usize)
            }

            fn offset(&self, (r, c, s): (usize, usize, usize)) -> usize {
                r * self.stride[2] as usize + c * self.stride[1] as usize + s * self.stride[0] as usize
            }

            fn data(&self) -> *mut <$elem as Element>::Raw {
                self.d
            }

            fn set_data(&mut self, data: *mut <$elem as Element>::Raw) {
                self.d = data;
            }

            fn owns_data(&self) -> bool {
                self.flags.contains(BufferFlags::OWNS_DATA)
            }

            fn describe_host(data: *mut <$elem as Element>::Raw, shape: &Ix3) -> Result<Self> {
                let cols = extent(shape[1])?;
                let slices = extent(shape[2])?;
                let row_stride = cols
                    .checked_mul(slices)
                    .ok_or_else(|| RadarError::Shape("cube row stride does not fit in 32 bits".into()))?;
                Ok(Self {
                    d: data,
                    rows: extent(shape[0])?,
                    cols,
                    slices,
                    stride: [1, slices, row_stride],
                    flags: BufferFlags::empty(),
                })
            }

            fn destructor(api: &RadarApi) -> unsafe extern "C" fn(*mut Self) {
                api.$destroy
            }
        }
    };
}

vector_buffer!(VectorR, f32, ifx_vec_destroy_r);
vector_buffer!(VectorC, Complex32, ifx_vec_destroy_c);
matrix_buffer!(MatrixR, f32, ifx_mat_destroy_r);
matrix_buffer!(MatrixC, Complex32, ifx_mat_destroy_c);
cube_buffer!(CubeR, f32, ifx_cube_destroy_r);
cube_buffer!(CubeC, Complex32, ifx_cube_destroy_c);

/// Copy a native buffer into a fresh row-major array, honouring its strides.
///
/// # Safety
/// Every element reachable through the descriptor's extents and strides must
/// be readable for the duration of the call.
pub unsafe fn copy_to_array<B: NativeBuffer>(buffer: &B) -> Result<Array<B::Elem, B::Dim>> {
    let shape = buffer.shape();
    let data = buffer.data();
    let len = shape
        .size_checked()
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| RadarError::Shape(format!("buffer of shape {:?} is too large", shape.slice())))?;
    if data.is_null() && len > 0 {
        return Err(RadarError::Shape(format!(
            "buffer of shape {:?} has no data",
            shape.slice()
        )));
    }
    Ok(Array::from_shape_fn(shape, |index| {
        B::Elem::from_raw(*data.add(buffer.offset(index)))
    }))
}

/// A buffer allocated by the SDK. Released by its destroy call when dropped.
pub struct NativeOwned<'a, B: NativeBuffer> {
    ptr: NonNull<B>,
    api: &'a RadarApi,
}

impl<'a, B: NativeBuffer> NativeOwned<'a, B> {
    /// Take ownership of `ptr`. `None` for NULL.
    ///
    /// # Safety
    /// `ptr` must be NULL or a live buffer allocated by the SDK that nothing
    /// else will destroy.
    pub unsafe fn from_raw(ptr: *mut B, api: &'a RadarApi) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, api })
    }

    pub fn descriptor(&self) -> &B {
        unsafe { self.ptr.as_ref() }
    }

    pub fn as_ptr(&self) -> *mut B {
        self.ptr.as_ptr()
    }

    pub fn to_array(&self) -> Result<Array<B::Elem, B::Dim>> {
        unsafe { copy_to_array(self.descriptor()) }
    }

    /// Copy the contents out, then release the native buffer.
    pub fn into_array(self) -> Result<Array<B::Elem, B::Dim>> {
        self.to_array()
    }
}

impl<B: NativeBuffer> Drop for NativeOwned<'_, B> {
    fn drop(&mut self) {
        unsafe { (B::destructor(self.api))(self.ptr.as_ptr()) }
    }
}

/// Host memory described to the SDK.
pub struct HostView<B: NativeBuffer> {
    descriptor: B,
    array: Array<B::Elem, B::Dim>,
}

impl<B: NativeBuffer> HostView<B> {
    /// Wrap an owned array. Non-contiguous arrays are copied into row-major order first.
    pub fn new(array: Array<B::Elem, B::Dim>) -> Result<Self> {
        let mut array = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        let shape = array.raw_dim();
        let descriptor = B::describe_host(array.as_mut_ptr().cast(), &shape)?;
        Ok(Self { descriptor, array })
    }

    /// Copy any array or view into a fresh contiguous buffer.
    pub fn from_array<S: Data<Elem = B::Elem>>(array: &ArrayBase<S, B::Dim>) -> Result<Self> {
        Self::new(array.as_standard_layout().into_owned())
    }

    pub fn descriptor(&self) -> &B {
        &self.descriptor
    }

    /// Descriptor pointer for a native call. Valid while `self` is borrowed.
    pub fn as_mut_ptr(&mut self) -> *mut B {
        self.descriptor.set_data(self.array.as_mut_ptr().cast());
        &mut self.descriptor
    }

    pub fn array(&self) -> &Array<B::Elem, B::Dim> {
        &self.array
    }

    pub fn view_mut(&mut self) -> ArrayViewMut<'_, B::Elem, B::Dim> {
        self.array.view_mut()
    }

    pub fn into_array(self) -> Array<B::Elem, B::Dim> {
        self.array
    }
}

impl<B: NativeBuffer> std::fmt::Debug for HostView<B>
where
    B::Elem: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostView")
            .field("shape", &self.array.shape())
            .field("array", &self.array)
            .finish()
    }
}
