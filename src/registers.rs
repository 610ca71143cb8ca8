/// Access class of a device register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

/// A named register in a chip's register map
pub trait Register: Copy {
    fn addr(self) -> u8;
    fn name(self) -> &'static str;
    fn access(self) -> Access;

    fn is_writable(self) -> bool {
        self.access() == Access::ReadWrite
    }
}

/// Declares a chip's register map as a `#[repr(u8)]` enum plus a slice of
/// every register, each tagged `r` or `rw`.
macro_rules! registers {
    (@access r) => { $crate::registers::Access::Read };
    (@access rw) => { $crate::registers::Access::ReadWrite };
    (
        $(#[$meta:meta])*
        $enum_name:ident, $slice_name:ident {
            $($name:ident = $val:expr => $access:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum $enum_name {
            $($name = $val),*
        }

        pub const $slice_name: &[$enum_name] = &[
            $($enum_name::$name),*
        ];

        impl $crate::registers::Register for $enum_name {
            fn addr(self) -> u8 {
                self as u8
            }

            fn name(self) -> &'static str {
                match self {
                    $($enum_name::$name => stringify!($name),)*
                }
            }

            fn access(self) -> $crate::registers::Access {
                match self {
                    $($enum_name::$name => $crate::registers::registers!(@access $access),)*
                }
            }
        }

        impl From<$enum_name> for u8 {
            fn from(r: $enum_name) -> u8 {
                r as u8
            }
        }
    };
}

pub(crate) use registers;
