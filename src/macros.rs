/// Creates a newtype wrapper around a string-like value, in the style of the `oauth2` crate's
/// helper macro (which is not part of that crate's public interface).
macro_rules! new_type {
    // Convenience pattern without an impl.
    (
        $(#[$attr:meta])*
        $name:ident(
            $(#[$type_attr:meta])*
            $type:ty
        )
    ) => {
        new_type![
            $(#[$attr])*
            $name(
                $(#[$type_attr])*
                $type
            )
            impl {}
        ];
    };
    // Main entry point with an impl.
    (
        $(#[$attr:meta])*
        $name:ident(
            $(#[$type_attr:meta])*
            $type:ty
        )
        impl {
            $($item:tt)*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name(
            $(#[$type_attr])*
            $type
        );
        impl $name {
            $($item)*

            #[doc = concat!(
                "Create a new `",
                stringify!($name),
                "` to wrap the given `",
                stringify!($type),
                "`."
            )]
            pub fn new(s: $type) -> Self {
                $name(s)
            }
        }
        impl std::ops::Deref for $name {
            type Target = $type;
            fn deref(&self) -> &$type {
                &self.0
            }
        }
        impl From<$name> for $type {
            fn from(t: $name) -> $type {
                t.0
            }
        }
    };
}

/// Creates a newtype wrapper around a URL that remembers the string it was parsed from, so that
/// the original representation (e.g., trailing slashes) can be returned unchanged.
macro_rules! new_url_type {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Clone)]
        pub struct $name(url::Url, String);
        impl $name {
            #[doc = concat!(
                "Create a new `",
                stringify!($name),
                "` from a `String` to wrap a URL."
            )]
            pub fn new(url: String) -> Result<Self, url::ParseError> {
                Ok($name(url::Url::parse(&url)?, url))
            }
            #[doc = concat!("Create a new `", stringify!($name), "` from a `Url` to wrap a URL.")]
            pub fn from_url(url: url::Url) -> Self {
                let s = url.to_string();
                Self(url, s)
            }
            #[doc = concat!("Return this `", stringify!($name), "` as a parsed `Url`.")]
            pub fn url(&self) -> &url::Url {
                &self.0
            }
        }
        impl std::ops::Deref for $name {
            type Target = String;
            fn deref(&self) -> &String {
                &self.1
            }
        }
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.1).finish()
            }
        }
        impl PartialEq for $name {
            fn eq(&self, other: &$name) -> bool {
                self.1 == other.1
            }
        }
        impl Eq for $name {}
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                use serde::de::Error;

                let url_str = String::deserialize(deserializer)?;
                $name::new(url_str).map_err(D::Error::custom)
            }
        }
        impl serde::Serialize for $name {
            fn serialize<SE>(&self, serializer: SE) -> Result<SE::Ok, SE::Error>
            where
                SE: serde::Serializer,
            {
                serializer.serialize_str(&self.1)
            }
        }
    };
}
