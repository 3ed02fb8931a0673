//! Guards for lists and strings allocated by the SDK.

use crate::loader::RadarApi;
use std::ffi::{c_char, c_void, CStr};
use std::ptr::NonNull;

/// An `ifx_List_t` returned by the SDK. Destroyed when dropped.
pub struct NativeList<'a> {
    ptr: NonNull<c_void>,
    api: &'a RadarApi,
}

impl<'a> NativeList<'a> {
    /// # Safety
    /// `ptr` must be NULL or a live list that nothing else will destroy.
    pub unsafe fn from_raw(ptr: *mut c_void, api: &'a RadarApi) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, api })
    }

    pub fn len(&self) -> usize {
        unsafe { (self.api.ifx_list_size)(self.ptr.as_ptr()) }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw element pointer. Valid until the list is dropped.
    pub fn get(&self, index: usize) -> *mut c_void {
        unsafe { (self.api.ifx_list_get)(self.ptr.as_ptr(), index) }
    }

    /// Copy every element out as `T`. `None` if an element pointer is NULL.
    ///
    /// # Safety
    /// Every element of the list must be a valid `T`.
    pub unsafe fn copy_items<T: Copy>(&self) -> Option<Vec<T>> {
        (0..self.len())
            .map(|i| {
                let item = self.get(i) as *const T;
                (!item.is_null()).then(|| *item)
            })
            .collect()
    }
}

impl Drop for NativeList<'_> {
    fn drop(&mut self) {
        unsafe { (self.api.ifx_list_destroy)(self.ptr.as_ptr()) }
    }
}

/// A heap string returned by the SDK. Freed with `ifx_mem_free` when dropped.
pub struct NativeString<'a> {
    ptr: NonNull<c_char>,
    api: &'a RadarApi,
}

impl<'a> NativeString<'a> {
    /// # Safety
    /// `ptr` must be NULL or a NUL-terminated string allocated by the SDK
    /// that nothing else will free.
    pub unsafe fn from_raw(ptr: *mut c_char, api: &'a RadarApi) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, api })
    }

    pub fn to_string_lossy(&self) -> String {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for NativeString<'_> {
    fn drop(&mut self) {
        unsafe { (self.api.ifx_mem_free)(self.ptr.as_ptr().cast()) }
    }
}
