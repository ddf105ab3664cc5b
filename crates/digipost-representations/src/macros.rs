/// Declare a closed enumeration with its wire names.
///
/// Unknown wire values decode to [`RepresentationError::UnknownVariant`]
/// tagged with `family`.
///
/// [`RepresentationError::UnknownVariant`]: crate::domain::errors::RepresentationError::UnknownVariant
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $family:literal {
            $( $(#[$variant_meta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$variant_meta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::codec::XmlValue for $name {
            fn to_xml_value(&self) -> String {
                self.as_str().to_string()
            }

            fn from_xml_value(
                raw: &str,
                _element: &str,
                _field: &str,
            ) -> Result<Self, $crate::domain::errors::RepresentationError> {
                match raw.trim() {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::domain::errors::RepresentationError::UnknownVariant {
                        family: $family,
                        discriminator: other.to_string(),
                    }),
                }
            }
        }
    };
}
