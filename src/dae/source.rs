//! `<source>` blocks: a typed data array plus the accessor describing its
//! record layout.
//!
//! Every other builder emits its data through [`build_source`].

use xmltree::Element;

use super::element::{fragment, ElementExt};
use crate::util::{format_floats, Error, Result};

/// Element type of an accessor param.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Name,
    Float,
    Float4x4,
}

impl ParamType {
    /// Number of array values one param consumes.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Self::Name | Self::Float => 1,
            Self::Float4x4 => 16,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Float => "float",
            Self::Float4x4 => "float4x4",
        }
    }
}

/// One named component of an accessor record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
}

impl Param {
    pub const fn new(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty }
    }
}

pub const XYZ: [Param; 3] = [
    Param::new("X", ParamType::Float),
    Param::new("Y", ParamType::Float),
    Param::new("Z", ParamType::Float),
];
pub const ST: [Param; 2] = [Param::new("S", ParamType::Float), Param::new("T", ParamType::Float)];
pub const JOINT: [Param; 1] = [Param::new("JOINT", ParamType::Name)];
pub const TRANSFORM: [Param; 1] = [Param::new("TRANSFORM", ParamType::Float4x4)];
pub const WEIGHT: [Param; 1] = [Param::new("WEIGHT", ParamType::Float)];
pub const TIME: [Param; 1] = [Param::new("TIME", ParamType::Float)];
pub const INTERPOLATION: [Param; 1] = [Param::new("INTERPOLATION", ParamType::Name)];

/// Array payload of a source.
#[derive(Clone, Copy, Debug)]
pub enum SourceData<'a> {
    Names(&'a [String]),
    Floats(&'a [f32]),
}

impl SourceData<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Names(v) => v.len(),
            Self::Floats(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn array_element(&self) -> &'static str {
        match self {
            Self::Names(_) => "Name_array",
            Self::Floats(_) => "float_array",
        }
    }

    fn tokens(&self) -> String {
        match self {
            Self::Names(v) => v.join(" "),
            Self::Floats(v) => format_floats(v.iter()),
        }
    }
}

/// Total record width of an accessor.
pub fn stride_of(params: &[Param]) -> usize {
    params.iter().map(|p| p.ty.width()).sum()
}

/// Append a `<source id=..>` to `container`.
///
/// The array gets id `<id>.data` and publishes the raw value count. The
/// accessor publishes `count = len / stride` and `stride`; with an empty
/// param list the stride is zero and both are omitted.
///
/// A length that does not divide into whole records is rejected.
pub fn build_source(container: &mut Element, id: &str, data: SourceData<'_>, params: &[Param]) -> Result<()> {
    let len = data.len();
    let stride = stride_of(params);
    if stride > 0 && len % stride != 0 {
        return Err(Error::StrideMismatch { id: id.to_string(), len, stride });
    }

    let array_id = format!("{}.data", id);
    let array = Element::new(data.array_element())
        .with_attr("id", &array_id)
        .with_attr("count", len)
        .with_text(data.tokens());

    let mut accessor = Element::new("accessor").with_attr("source", fragment(&array_id));
    if stride > 0 {
        accessor = accessor.with_attr("count", len / stride).with_attr("stride", stride);
    }
    for p in params {
        accessor.push(Element::new("param").with_attr("name", p.name).with_attr("type", p.ty.as_str()));
    }

    container.push(
        Element::new("source")
            .with_attr("id", id)
            .with_child(array)
            .with_child(Element::new("technique_common").with_child(accessor)),
    );
    Ok(())
}
