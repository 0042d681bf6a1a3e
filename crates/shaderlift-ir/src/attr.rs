//! Attributes attached to declarations and statements.

/// A pipeline stage an entry function is bound to.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ShaderStage {
    Compute,
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Parses a stage name as written in a `stage` annotation.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "compute" => Some(Self::Compute),
            "vertex" => Some(Self::Vertex),
            "fragment" => Some(Self::Fragment),
            _ => None,
        }
    }
}

macro_rules! semantic_types {
    ($($variant:ident),* $(,)?) => {
        /// System-value semantic bound to an entry parameter or field.
        #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
        pub enum SemanticType {
            Invalid,
            $($variant,)*
        }

        impl SemanticType {
            /// Looks a semantic up by its exact name, yielding
            /// [`SemanticType::Invalid`] for unknown names.
            pub fn from_name(name: &str) -> Self {
                match name {
                    $(stringify!($variant) => Self::$variant,)*
                    _ => Self::Invalid,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    Self::Invalid => "Invalid",
                    $(Self::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

semantic_types! {
    Position,
    ClipDistance,
    CullDistance,
    RenderTarget0,
    RenderTarget1,
    RenderTarget2,
    RenderTarget3,
    RenderTarget4,
    RenderTarget5,
    RenderTarget6,
    RenderTarget7,
    Depth,
    DepthGreaterEqual,
    DepthLessEqual,
    StencilRef,
    VertexID,
    InstanceID,
    GSInstanceID,
    TessFactor,
    InsideTessFactor,
    DomainLocation,
    ControlPointID,
    PrimitiveID,
    IsFrontFace,
    SampleIndex,
    SampleMask,
    Barycentrics,
    ThreadID,
    GroupID,
    ThreadPositionInGroup,
    ThreadIndexInGroup,
    ViewID,
}

/// Interpolation qualifier of a stage-inout field.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum InterpolationMode {
    Linear,
    NoInterpolation,
    Centroid,
    Sample,
    NoPerspective,
    Invalid,
}

impl InterpolationMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Self::Linear,
            "nointerpolation" => Self::NoInterpolation,
            "centroid" => Self::Centroid,
            "sample" => Self::Sample,
            "noperspective" => Self::NoPerspective,
            _ => Self::Invalid,
        }
    }
}

/// Metadata attached to a type, field, function, variable, or loop.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Attribute {
    Stage(ShaderStage),
    /// Compute dispatch dimensions `[x, y, z]`.
    KernelSize([u32; 3]),
    Semantic(SemanticType),
    Interpolation(InterpolationMode),
    /// `!0` in either slot means "unassigned".
    ResourceBind { group: u32, binding: u32 },
    PushConstant,
    StageInout,
    /// Keep the loop rolled.
    Loop,
    /// Unroll the loop; `u32::MAX` lets the backend pick the count.
    Unroll(u32),
}

/// Returns `true` if `attrs` holds an attribute equal to `attr`.
pub fn has_attr(attrs: &[Attribute], attr: Attribute) -> bool {
    attrs.contains(&attr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_lookup() {
        assert_eq!(SemanticType::from_name("ThreadID"), SemanticType::ThreadID);
        assert_eq!(SemanticType::from_name("RenderTarget3").name(), "RenderTarget3");
        assert_eq!(SemanticType::from_name("thread_id"), SemanticType::Invalid);
    }

    #[test]
    fn interpolation_lookup() {
        assert_eq!(
            InterpolationMode::from_name("nointerpolation"),
            InterpolationMode::NoInterpolation
        );
        assert_eq!(InterpolationMode::from_name("flat"), InterpolationMode::Invalid);
    }

    #[test]
    fn stage_names() {
        assert_eq!(ShaderStage::from_name("vertex"), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_name("mesh"), None);
    }
}
