//! Macro generating port error enums with `impl Into` constructors.

/// Declare a `thiserror` enum plus one snake_case constructor per variant.
///
/// Every field parameter accepts `impl Into<T>`, so adapters can pass `&str`
/// where the variant stores a `String`.
macro_rules! define_port_error {
    (@ctor $name:ident $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $name:ident $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $crate::domain::ports::define_port_error!(@ctor_impl $name $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        $crate::domain::ports::define_port_error!(
            @ctor_impl
            $name
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $(#[doc = concat!("The `", stringify!($field), "` detail.")] $field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                $crate::domain::ports::define_port_error!(@ctor $name $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

/// Connection and query failures shared by the record-store ports.
macro_rules! define_store_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            connection => $connection:literal,
            query => $query:literal $(,)?
        }
    ) => {
        $crate::domain::ports::define_port_error! {
            $(#[$outer])*
            pub enum $name {
                /// The store could not be reached.
                Connection { message: String } => $connection,
                /// A statement failed.
                Query { message: String } => $query,
            }
        }

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                match error {
                    $name::Connection { message } => {
                        $crate::domain::Error::service_unavailable(message)
                    }
                    $name::Query { message } => $crate::domain::Error::internal(message),
                }
            }
        }
    };
}

pub(crate) use define_store_error;
