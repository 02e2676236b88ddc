use mapstream_types::Size;

use crate::data::FeatureType;
use crate::error::RenderError;
use crate::style::{FeatureTypeStyle, Rule};
use crate::surface::Surface;

/// Surface the features of a compiled style are painted onto.
#[derive(Debug)]
pub enum StyleTarget {
    /// The destination surface of the render.
    Destination,
    /// Transparent surface composited onto the destination after the layer is processed.
    Offscreen(Surface),
}

/// Rules of one feature type style applicable at the current scale.
#[derive(Debug)]
pub struct CompiledStyle<'a> {
    pub(crate) normal_rules: Vec<&'a Rule>,
    pub(crate) else_rules: Vec<&'a Rule>,
    pub(crate) target: StyleTarget,
}

impl<'a> CompiledStyle<'a> {
    /// Rules applied to every feature passing their predicate.
    pub fn normal_rules(&self) -> &[&'a Rule] {
        &self.normal_rules
    }

    /// Rules applied to features no normal rule matched.
    pub fn else_rules(&self) -> &[&'a Rule] {
        &self.else_rules
    }

    /// Surface of the style.
    pub fn target(&self) -> &StyleTarget {
        &self.target
    }

    pub(crate) fn rules(&self) -> impl Iterator<Item = &'a Rule> + '_ {
        self.normal_rules.iter().chain(&self.else_rules).copied()
    }
}

/// Selects the styles and rules of a layer that apply to its feature type at the given scale.
///
/// The first compiled style paints directly onto the destination, every following one gets its
/// own offscreen surface of `surface_size`. Styles without applicable rules are skipped.
pub fn compile_styles<'a>(
    styles: &'a [FeatureTypeStyle],
    feature_type: &FeatureType,
    scale: f64,
    surface_size: Size<u32>,
) -> Result<Vec<CompiledStyle<'a>>, RenderError> {
    let mut compiled = vec![];
    for style in styles {
        if !style.applies_to(feature_type) {
            log::debug!(
                "Style for type {:?} does not apply to {}",
                style.target_type_name,
                feature_type.name()
            );
            continue;
        }

        let (else_rules, normal_rules): (Vec<_>, Vec<_>) = style
            .rules
            .iter()
            .filter(|rule| rule.is_within_scale(scale))
            .partition(|rule| rule.is_else);

        if normal_rules.is_empty() && else_rules.is_empty() {
            continue;
        }

        let target = if compiled.is_empty() {
            StyleTarget::Destination
        } else {
            StyleTarget::Offscreen(Surface::new(surface_size.width(), surface_size.height())?)
        };

        compiled.push(CompiledStyle {
            normal_rules,
            else_rules,
            target,
        });
    }

    Ok(compiled)
}
