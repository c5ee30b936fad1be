//! Building Layout - bounds + config to the list of levels a building needs
//!
//! Level order matters: the reconciliation engine truncates from the end
//! when the building gets shorter, so the per-storey wall and corner levels
//! always come last.

use crate::bounds::Bounds;
use crate::level::{Initializer, LevelBlueprint, SnapMode};
use crate::game::config::{GeneratorConfig, RoofStyle};

pub const FLOOR_LEVEL: &str = "Floor";
pub const ROOF_LEVEL: &str = "Roof";
pub const PROPS_LEVEL: &str = "Props";

pub fn wall_level_name(storey: i32) -> String {
    format!("Wall_{storey}")
}

pub fn corner_level_name(storey: i32) -> String {
    format!("Corner_{storey}")
}

/// Produces the desired level list for a building.
pub trait LevelLayout {
    fn blueprints(&self, bounds: &Bounds, config: &GeneratorConfig) -> Vec<LevelBlueprint>;
}

/// Rectangular box: floor, roof, optional props ring, one wall ring (and
/// optionally four corner caps) per storey.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxLayout;

impl LevelLayout for BoxLayout {
    fn blueprints(&self, bounds: &Bounds, config: &GeneratorConfig) -> Vec<LevelBlueprint> {
        let width = bounds.width.max(0);
        let height = bounds.height.max(0);
        let area = bounds.area();
        let perimeter = bounds.perimeter();
        let shape = config.shape.clone();
        let mut blueprints = Vec::with_capacity(3 + 2 * height as usize);

        blueprints.push(
            LevelBlueprint::new(
                FLOOR_LEVEL,
                Initializer::new(
                    config.floor_resolution,
                    SnapMode::Default,
                    area,
                    width,
                    config.floor_asset.clone(),
                ),
            )
            .with_shape(shape.clone()),
        );

        let roof = match config.roof_style {
            RoofStyle::Flat => Initializer::new(
                config.roof_resolution,
                SnapMode::Rooftop,
                area,
                width,
                config.roof_asset.clone(),
            ),
            RoofStyle::Eaves => Initializer::new(
                config.roof_resolution,
                SnapMode::Roof,
                perimeter,
                width,
                config.roof_asset.clone(),
            ),
        };
        let mut roof = LevelBlueprint::new(ROOF_LEVEL, roof)
            .at_height(height as f32)
            .with_shape(shape.clone());
        if height > 0 {
            roof = roof.resting_on(wall_level_name(height - 1));
        }
        blueprints.push(roof);

        if let Some(class) = &config.prop_class {
            if config.props_per_level > 0 {
                let props = Initializer::new(
                    config.wall_resolution,
                    SnapMode::Wall,
                    config.props_per_level.min(perimeter),
                    width,
                    config.door_asset.clone(),
                )
                .with_actor_class(class.clone());
                blueprints.push(LevelBlueprint::new(PROPS_LEVEL, props));
            }
        }

        for storey in 0..height {
            blueprints.push(
                LevelBlueprint::new(
                    wall_level_name(storey),
                    Initializer::new(
                        config.wall_resolution,
                        SnapMode::Wall,
                        perimeter,
                        width,
                        config.wall_asset.clone(),
                    ),
                )
                .at_height(storey as f32)
                .with_shape(shape.clone()),
            );
            if config.corners {
                blueprints.push(
                    LevelBlueprint::new(
                        corner_level_name(storey),
                        Initializer::new(
                            config.corner_resolution,
                            SnapMode::Corner,
                            perimeter,
                            width,
                            config.corner_asset.clone(),
                        ),
                    )
                    .at_height(storey as f32),
                );
            }
        }
        blueprints
    }
}
