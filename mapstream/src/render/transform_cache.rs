use std::rc::Rc;
use std::sync::Arc;

use ahash::HashMap;
use mapstream_types::geo::{find_transform, AffineTransform, ChainProjection, Crs, Projection};
use mapstream_types::Rect;

use crate::error::RenderError;
use crate::render::decimator::Decimator;
use crate::style::Symbolizer;

/// Source to device transform of a symbolizer with its decimator.
pub struct SymbolizerAssociation {
    /// CRS of the geometries the symbolizer draws.
    pub source_crs: Crs,
    /// Transform from `source_crs` into pixels.
    pub transform: Rc<dyn Projection>,
    /// Decimator matching the transform.
    pub decimator: Rc<Decimator>,
}

/// Transforms and decimators of one render, computed once per symbolizer.
///
/// Symbolizers drawing geometries in the same CRS share one transform and one decimator.
pub struct TransformCache {
    render_crs: Crs,
    world_to_device: AffineTransform,
    screen: Rect,
    generalization_distance: f64,
    associations: HashMap<(usize, Crs), Rc<SymbolizerAssociation>>,
    by_crs: HashMap<Crs, Rc<SymbolizerAssociation>>,
}

impl TransformCache {
    /// Creates an empty cache for a render into `screen` pixels.
    pub fn new(
        render_crs: Crs,
        world_to_device: AffineTransform,
        screen: Rect,
        generalization_distance: f64,
    ) -> Self {
        Self {
            render_crs,
            world_to_device,
            screen,
            generalization_distance,
            associations: HashMap::default(),
            by_crs: HashMap::default(),
        }
    }

    /// Association of the symbolizer drawing geometries in `source_crs`.
    pub fn get(
        &mut self,
        symbolizer: &Arc<Symbolizer>,
        source_crs: &Crs,
    ) -> Result<Rc<SymbolizerAssociation>, RenderError> {
        let key = (Arc::as_ptr(symbolizer) as usize, source_crs.clone());
        if let Some(association) = self.associations.get(&key) {
            return Ok(association.clone());
        }

        let association = match self.by_crs.get(source_crs) {
            Some(association) => association.clone(),
            None => {
                let association = Rc::new(self.create(source_crs)?);
                self.by_crs.insert(source_crs.clone(), association.clone());
                association
            }
        };

        self.associations.insert(key, association.clone());
        Ok(association)
    }

    /// Number of distinct transforms created.
    pub fn transform_count(&self) -> usize {
        self.by_crs.len()
    }

    fn create(&self, source_crs: &Crs) -> Result<SymbolizerAssociation, RenderError> {
        if !self.world_to_device.is_invertible() {
            return Err(RenderError::NonInvertibleTransform);
        }

        let transform: Rc<dyn Projection> = if source_crs == &self.render_crs {
            Rc::new(self.world_to_device)
        } else {
            let reprojection = find_transform(source_crs, &self.render_crs)?;
            Rc::new(ChainProjection::new(
                reprojection,
                Box::new(self.world_to_device),
            ))
        };

        let decimator = Decimator::new(&*transform, &self.screen, self.generalization_distance);
        log::debug!("Created transform from {source_crs} to device space");

        Ok(SymbolizerAssociation {
            source_crs: source_crs.clone(),
            transform,
            decimator: Rc::new(decimator),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use mapstream_types::Point2d;

    use super::*;
    use crate::color::Color;
    use crate::style::{LineSymbolizer, PolygonSymbolizer};

    fn cache(world_to_device: AffineTransform) -> TransformCache {
        TransformCache::new(
            Crs::EPSG3857,
            world_to_device,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            1.0,
        )
    }

    #[test]
    fn transforms_are_shared() {
        let world_to_device =
            AffineTransform::world_to_screen(&Rect::new(0.0, 0.0, 1000.0, 1000.0), 100.0, 100.0)
                .unwrap();
        let mut cache = cache(world_to_device);
        let line = Arc::new(Symbolizer::Line(LineSymbolizer::new(Color::RED, 1.0)));
        let polygon = Arc::new(Symbolizer::Polygon(PolygonSymbolizer::new(Color::RED)));

        let a = cache.get(&line, &Crs::EPSG3857).unwrap();
        let b = cache.get(&line, &Crs::EPSG3857).unwrap();
        let c = cache.get(&polygon, &Crs::EPSG3857).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&a, &c));

        let geographic = cache.get(&line, &Crs::WGS84).unwrap();
        assert!(!Rc::ptr_eq(&a, &geographic));
        assert_eq!(cache.transform_count(), 2);

        let device = a.transform.project(&Point2d::new(1000.0, 0.0)).unwrap();
        assert_relative_eq!(device.x, 100.0);
        assert_relative_eq!(device.y, 100.0);
    }

    #[test]
    fn non_invertible_transform_is_rejected() {
        let mut cache = cache(AffineTransform::from_coefficients(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        let line = Arc::new(Symbolizer::Line(LineSymbolizer::new(Color::RED, 1.0)));
        assert_matches!(
            cache.get(&line, &Crs::EPSG3857).err(),
            Some(RenderError::NonInvertibleTransform)
        );
    }
}
