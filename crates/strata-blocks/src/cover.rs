use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::BlockError;
use crate::types::{Block, TreeSpecies};

/// Land-cover code used for open water; raster nodata is mapped to it.
pub const WATER_CODE: i32 = 11;

/// Code used when a raster carries a class the table does not know.
const FALLBACK_CODE: i32 = 71;

#[derive(Clone, Debug, PartialEq)]
pub struct CoverClass {
    pub code: i32,
    pub name: String,
    /// Top block of a dry column.
    pub surface: Block,
    /// Crust material between stone and the surface.
    pub subsurface: Block,
    /// Top block of a submerged column.
    pub bed: Block,
    pub water: bool,
    /// Chance per dry column of planting a tree.
    pub tree_density: f32,
    pub species: Vec<TreeSpecies>,
}

impl CoverClass {
    fn new(code: i32, name: &str, surface: Block, subsurface: Block) -> Self {
        Self {
            code,
            name: name.to_string(),
            surface,
            subsurface,
            bed: Block::SAND,
            water: false,
            tree_density: 0.0,
            species: Vec::new(),
        }
    }

    fn trees(mut self, density: f32, species: &[TreeSpecies]) -> Self {
        self.tree_density = density;
        self.species = species.to_vec();
        self
    }

    fn bed(mut self, bed: Block) -> Self {
        self.bed = bed;
        self
    }

    fn water(mut self) -> Self {
        self.water = true;
        self
    }
}

/// Config-side override of a single cover class. Missing fields keep the
/// value of the built-in class with the same code (or the fallback class).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CoverDef {
    pub code: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub subsurface: Option<String>,
    #[serde(default)]
    pub bed: Option<String>,
    #[serde(default)]
    pub water: Option<bool>,
    #[serde(default)]
    pub tree_density: Option<f32>,
    #[serde(default)]
    pub species: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct CoverConfig {
    #[serde(default)]
    cover: Vec<CoverDef>,
}

#[derive(Clone, Debug)]
pub struct CoverTable {
    classes: BTreeMap<i32, CoverClass>,
    fallback: CoverClass,
}

impl Default for CoverTable {
    fn default() -> Self {
        Self::nlcd()
    }
}

impl CoverTable {
    /// National Land Cover Database classes.
    pub fn nlcd() -> Self {
        use TreeSpecies::*;
        let classes = vec![
            CoverClass::new(WATER_CODE, "open_water", Block::SAND, Block::SAND).water(),
            CoverClass::new(12, "ice_snow", Block::SNOW, Block::DIRT).bed(Block::ICE),
            CoverClass::new(21, "developed_open", Block::GRASS, Block::DIRT).trees(0.002, &[Oak]),
            CoverClass::new(22, "developed_low", Block::COBBLESTONE, Block::STONE),
            CoverClass::new(23, "developed_medium", Block::COBBLESTONE, Block::STONE),
            CoverClass::new(24, "developed_high", Block::COBBLESTONE, Block::STONE),
            CoverClass::new(31, "barren", Block::SAND, Block::SANDSTONE),
            CoverClass::new(32, "shoreline", Block::SAND, Block::SAND),
            CoverClass::new(41, "deciduous_forest", Block::GRASS, Block::DIRT)
                .trees(0.05, &[Oak, Birch]),
            CoverClass::new(42, "evergreen_forest", Block::GRASS, Block::DIRT).trees(0.05, &[Spruce]),
            CoverClass::new(43, "mixed_forest", Block::GRASS, Block::DIRT)
                .trees(0.05, &[Oak, Birch, Spruce]),
            CoverClass::new(51, "dwarf_scrub", Block::GRASS, Block::DIRT).trees(0.02, &[Shrub]),
            CoverClass::new(52, "shrub_scrub", Block::GRASS, Block::DIRT)
                .trees(0.03, &[Shrub, Acacia]),
            CoverClass::new(71, "grassland", Block::GRASS, Block::DIRT).trees(0.002, &[Oak]),
            CoverClass::new(72, "sedge", Block::GRASS, Block::DIRT),
            CoverClass::new(81, "pasture", Block::GRASS, Block::DIRT),
            CoverClass::new(82, "cultivated_crops", Block::FARMLAND, Block::DIRT),
            CoverClass::new(90, "woody_wetlands", Block::GRASS, Block::CLAY)
                .trees(0.04, &[Jungle, Oak])
                .bed(Block::CLAY),
            CoverClass::new(95, "herbaceous_wetlands", Block::GRASS, Block::CLAY).bed(Block::CLAY),
        ];
        let classes: BTreeMap<i32, CoverClass> = classes.into_iter().map(|c| (c.code, c)).collect();
        let fallback = classes
            .get(&FALLBACK_CODE)
            .cloned()
            .unwrap_or_else(|| CoverClass::new(FALLBACK_CODE, "grassland", Block::GRASS, Block::DIRT));
        Self { classes, fallback }
    }

    /// Class for `code`, or the grassland fallback for unknown codes.
    #[inline]
    pub fn get(&self, code: i32) -> &CoverClass {
        self.classes.get(&code).unwrap_or(&self.fallback)
    }

    #[inline]
    pub fn contains(&self, code: i32) -> bool {
        self.classes.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &CoverClass> {
        self.classes.values()
    }

    pub fn apply_overrides(&mut self, defs: &[CoverDef]) -> Result<(), BlockError> {
        for def in defs {
            let mut class = self
                .classes
                .get(&def.code)
                .cloned()
                .unwrap_or_else(|| CoverClass {
                    code: def.code,
                    ..self.fallback.clone()
                });
            if let Some(name) = &def.name {
                class.name = name.clone();
            }
            if let Some(b) = &def.surface {
                class.surface = parse_block(b)?;
            }
            if let Some(b) = &def.subsurface {
                class.subsurface = parse_block(b)?;
            }
            if let Some(b) = &def.bed {
                class.bed = parse_block(b)?;
            }
            if let Some(w) = def.water {
                class.water = w;
            }
            if let Some(d) = def.tree_density {
                if !(0.0..=1.0).contains(&d) {
                    return Err(BlockError::InvalidCover {
                        code: def.code,
                        msg: format!("tree_density {d} outside 0..=1"),
                    });
                }
                class.tree_density = d;
            }
            if let Some(names) = &def.species {
                class.species = names
                    .iter()
                    .map(|n| {
                        TreeSpecies::from_name(n).ok_or_else(|| BlockError::UnknownSpecies(n.clone()))
                    })
                    .collect::<Result<_, _>>()?;
            }
            if class.tree_density > 0.0 && class.species.is_empty() {
                return Err(BlockError::InvalidCover {
                    code: def.code,
                    msg: "tree_density set without species".into(),
                });
            }
            self.classes.insert(def.code, class);
        }
        Ok(())
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, BlockError> {
        let cfg: CoverConfig = toml::from_str(toml_str)?;
        let mut table = Self::nlcd();
        table.apply_overrides(&cfg.cover)?;
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BlockError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

fn parse_block(name: &str) -> Result<Block, BlockError> {
    Block::from_name(name).ok_or_else(|| BlockError::UnknownBlock(name.to_string()))
}
