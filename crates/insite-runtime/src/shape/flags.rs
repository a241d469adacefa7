//! Type-level booleans and three-state toggles.

use crate::config::Section;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Yes {}
    impl Sealed for super::No {}
    impl Sealed for super::Implicit {}
    impl Sealed for super::Requested {}
    impl Sealed for super::Disabled {}
}

/// A boolean known at compile time.
///
/// `Slot<T>` is `T` when the flag is set and [`Absent`] otherwise, so a
/// struct field typed `F::Slot<T>` only carries a value when it must.
pub trait Flag: sealed::Sealed {
    const ON: bool;

    type Not: Flag;
    type And<F: Flag>: Flag;
    type Or<F: Flag>: Flag;
    type Slot<T>;

    /// Fit a runtime value into the slot. `None` when presence disagrees.
    fn fill<T>(value: Option<T>) -> Option<Self::Slot<T>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Yes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct No;

/// Placeholder stored where a subsystem is statically absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Absent;

impl Flag for Yes {
    const ON: bool = true;

    type Not = No;
    type And<F: Flag> = F;
    type Or<F: Flag> = Yes;
    type Slot<T> = T;

    fn fill<T>(value: Option<T>) -> Option<T> {
        value
    }
}

impl Flag for No {
    const ON: bool = false;

    type Not = Yes;
    type And<F: Flag> = No;
    type Or<F: Flag> = F;
    type Slot<T> = Absent;

    fn fill<T>(value: Option<T>) -> Option<Absent> {
        match value {
            None => Some(Absent),
            Some(_) => None,
        }
    }
}

pub type Not<A> = <A as Flag>::Not;
pub type And<A, B> = <A as Flag>::And<B>;
pub type Or<A, B> = <A as Flag>::Or<B>;

/// A config section that can be left out, given, or explicitly nulled.
pub trait Toggle: sealed::Sealed {
    type IsRequested: Flag;
    type IsDisabled: Flag;

    /// The dynamic section matching this toggle.
    fn section<T>(value: Option<T>) -> Section<T>;
}

/// Section left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Implicit;

/// Section given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Requested;

/// Section explicitly nulled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl Toggle for Implicit {
    type IsRequested = No;
    type IsDisabled = No;

    fn section<T>(_value: Option<T>) -> Section<T> {
        Section::Absent
    }
}

impl Toggle for Requested {
    type IsRequested = Yes;
    type IsDisabled = No;

    fn section<T>(value: Option<T>) -> Section<T> {
        value.map_or(Section::Absent, Section::Enabled)
    }
}

impl Toggle for Disabled {
    type IsRequested = No;
    type IsDisabled = Yes;

    fn section<T>(_value: Option<T>) -> Section<T> {
        Section::Disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const _: () = assert!(<And<Yes, Yes> as Flag>::ON);
    const _: () = assert!(!<And<Yes, No> as Flag>::ON);
    const _: () = assert!(<Or<No, Yes> as Flag>::ON);
    const _: () = assert!(!<Or<No, No> as Flag>::ON);
    const _: () = assert!(<Not<No> as Flag>::ON);

    #[test]
    fn test_fill_checks_presence() {
        assert_eq!(Yes::fill(Some(3)), Some(3));
        assert_eq!(Yes::fill::<u8>(None), None);
        assert_eq!(No::fill::<u8>(None), Some(Absent));
        assert_eq!(No::fill(Some(3)), None);
    }

    #[test]
    fn test_toggle_sections() {
        assert_eq!(Implicit::section(Some(1)), Section::Absent);
        assert_eq!(Requested::section(Some(1)), Section::Enabled(1));
        assert_eq!(Disabled::section(Some(1)), Section::<i32>::Disabled);
    }
}
