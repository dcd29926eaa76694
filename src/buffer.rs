use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

/// Fixed-capacity uninitialized storage. Never reallocates.
#[derive(Debug)]
pub struct Buffer<T> {
    ptr: NonNull<T>,
    cap: usize,
}

unsafe impl<T: Send> Send for Buffer<T> {}
unsafe impl<T: Sync> Sync for Buffer<T> {}

impl<T> Buffer<T> {
    pub fn empty() -> Self {
        Buffer {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        if cap == 0 || mem::size_of::<T>() == 0 {
            return Buffer {
                ptr: NonNull::dangling(),
                cap,
            };
        }

        let layout = Layout::array::<T>(cap).expect("capacity overflow");
        let ptr = unsafe { alloc::alloc(layout) };

        match NonNull::new(ptr as *mut T) {
            Some(ptr) => Buffer { ptr, cap },
            None => alloc::handle_alloc_error(layout),
        }
    }

    #[inline]
    pub fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        if self.cap != 0 && mem::size_of::<T>() != 0 {
            unsafe {
                alloc::dealloc(
                    self.ptr.as_ptr() as *mut u8,
                    Layout::array::<T>(self.cap).expect("capacity overflow"),
                );
            }
        }
    }
}
