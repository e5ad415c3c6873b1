//! # Typed `x86_64` Control Registers for Early Firmware
//!
//! Bitfield views of the registers that firmware bring-up touches before any
//! operating system exists: [`Cr0`](cr0::Cr0) for cache control and
//! [`Rflags`](rflags::Rflags) for the CPUID availability probe.
//!
//! Reading and writing the live registers is gated behind the `asm` feature
//! and only compiled for `x86_64`. The bitfield types themselves are plain
//! data and can be used (and tested) anywhere.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(feature = "cr0")]
pub mod cr0;

#[cfg(feature = "rflags")]
pub mod rflags;

pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register access might be privileged and require Ring 0.
    unsafe fn load_unsafe() -> Self;
}

pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// Writing a control register changes processor behavior immediately.
    unsafe fn store_unsafe(self);
}

pub trait LoadRegister {
    /// Loads the register; the access is permitted at any privilege level.
    fn load() -> Self;
}

pub trait StoreRegister {
    /// Stores the register; the access is permitted at any privilege level.
    fn store(self);
}

impl<T> LoadRegisterUnsafe for T
where
    T: LoadRegister,
{
    #[inline]
    unsafe fn load_unsafe() -> Self {
        <Self as LoadRegister>::load()
    }
}

impl<T> StoreRegisterUnsafe for T
where
    T: StoreRegister,
{
    #[inline]
    unsafe fn store_unsafe(self) {
        <Self as StoreRegister>::store(self);
    }
}
