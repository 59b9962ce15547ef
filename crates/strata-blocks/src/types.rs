use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(pub u16);

impl Block {
    pub const AIR: Block = Block(0);
    pub const BEDROCK: Block = Block(1);
    pub const STONE: Block = Block(2);
    pub const DIRT: Block = Block(3);
    pub const GRASS: Block = Block(4);
    pub const SAND: Block = Block(5);
    pub const SANDSTONE: Block = Block(6);
    pub const GRAVEL: Block = Block(7);
    pub const CLAY: Block = Block(8);
    pub const WATER: Block = Block(9);
    pub const ICE: Block = Block(10);
    pub const SNOW: Block = Block(11);
    pub const COBBLESTONE: Block = Block(12);
    pub const FARMLAND: Block = Block(13);
    pub const OAK_LOG: Block = Block(20);
    pub const BIRCH_LOG: Block = Block(21);
    pub const SPRUCE_LOG: Block = Block(22);
    pub const JUNGLE_LOG: Block = Block(23);
    pub const ACACIA_LOG: Block = Block(24);
    pub const OAK_LEAVES: Block = Block(30);
    pub const BIRCH_LEAVES: Block = Block(31);
    pub const SPRUCE_LEAVES: Block = Block(32);
    pub const JUNGLE_LEAVES: Block = Block(33);
    pub const ACACIA_LEAVES: Block = Block(34);
    pub const COAL_ORE: Block = Block(40);
    pub const IRON_ORE: Block = Block(41);
    pub const GOLD_ORE: Block = Block(42);
    pub const REDSTONE_ORE: Block = Block(43);
    pub const LAPIS_ORE: Block = Block(44);
    pub const DIAMOND_ORE: Block = Block(45);

    const NAMES: &'static [(&'static str, Block)] = &[
        ("air", Block::AIR),
        ("bedrock", Block::BEDROCK),
        ("stone", Block::STONE),
        ("dirt", Block::DIRT),
        ("grass", Block::GRASS),
        ("sand", Block::SAND),
        ("sandstone", Block::SANDSTONE),
        ("gravel", Block::GRAVEL),
        ("clay", Block::CLAY),
        ("water", Block::WATER),
        ("ice", Block::ICE),
        ("snow", Block::SNOW),
        ("cobblestone", Block::COBBLESTONE),
        ("farmland", Block::FARMLAND),
        ("oak_log", Block::OAK_LOG),
        ("birch_log", Block::BIRCH_LOG),
        ("spruce_log", Block::SPRUCE_LOG),
        ("jungle_log", Block::JUNGLE_LOG),
        ("acacia_log", Block::ACACIA_LOG),
        ("oak_leaves", Block::OAK_LEAVES),
        ("birch_leaves", Block::BIRCH_LEAVES),
        ("spruce_leaves", Block::SPRUCE_LEAVES),
        ("jungle_leaves", Block::JUNGLE_LEAVES),
        ("acacia_leaves", Block::ACACIA_LEAVES),
        ("coal_ore", Block::COAL_ORE),
        ("iron_ore", Block::IRON_ORE),
        ("gold_ore", Block::GOLD_ORE),
        ("redstone_ore", Block::REDSTONE_ORE),
        ("lapis_ore", Block::LAPIS_ORE),
        ("diamond_ore", Block::DIAMOND_ORE),
    ];

    pub fn from_name(name: &str) -> Option<Block> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, b)| *b)
    }

    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(_, b)| *b == self)
            .map(|(n, _)| *n)
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == Block::AIR
    }

    #[inline]
    pub fn is_liquid(self) -> bool {
        self == Block::WATER
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        !self.is_air() && !self.is_liquid()
    }
}

/// Tree categories recorded in placement lists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeSpecies {
    Oak,
    Birch,
    Spruce,
    Jungle,
    Acacia,
    Shrub,
}

impl TreeSpecies {
    pub const ALL: [TreeSpecies; 6] = [
        TreeSpecies::Oak,
        TreeSpecies::Birch,
        TreeSpecies::Spruce,
        TreeSpecies::Jungle,
        TreeSpecies::Acacia,
        TreeSpecies::Shrub,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TreeSpecies::Oak => "oak",
            TreeSpecies::Birch => "birch",
            TreeSpecies::Spruce => "spruce",
            TreeSpecies::Jungle => "jungle",
            TreeSpecies::Acacia => "acacia",
            TreeSpecies::Shrub => "shrub",
        }
    }

    pub fn from_name(name: &str) -> Option<TreeSpecies> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    pub fn log(self) -> Block {
        match self {
            TreeSpecies::Oak | TreeSpecies::Shrub => Block::OAK_LOG,
            TreeSpecies::Birch => Block::BIRCH_LOG,
            TreeSpecies::Spruce => Block::SPRUCE_LOG,
            TreeSpecies::Jungle => Block::JUNGLE_LOG,
            TreeSpecies::Acacia => Block::ACACIA_LOG,
        }
    }

    pub fn leaves(self) -> Block {
        match self {
            TreeSpecies::Oak | TreeSpecies::Shrub => Block::OAK_LEAVES,
            TreeSpecies::Birch => Block::BIRCH_LEAVES,
            TreeSpecies::Spruce => Block::SPRUCE_LEAVES,
            TreeSpecies::Jungle => Block::JUNGLE_LEAVES,
            TreeSpecies::Acacia => Block::ACACIA_LEAVES,
        }
    }

    pub fn trunk_height(self) -> i32 {
        match self {
            TreeSpecies::Shrub => 1,
            TreeSpecies::Oak | TreeSpecies::Acacia => 5,
            TreeSpecies::Birch => 6,
            TreeSpecies::Spruce => 7,
            TreeSpecies::Jungle => 9,
        }
    }

    pub fn canopy_radius(self) -> i32 {
        match self {
            TreeSpecies::Shrub => 1,
            _ => 2,
        }
    }
}

/// Ore categories recorded in placement lists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OreKind {
    Coal,
    Iron,
    Gold,
    Redstone,
    Lapis,
    Diamond,
}

impl OreKind {
    pub const ALL: [OreKind; 6] = [
        OreKind::Coal,
        OreKind::Iron,
        OreKind::Gold,
        OreKind::Redstone,
        OreKind::Lapis,
        OreKind::Diamond,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OreKind::Coal => "coal",
            OreKind::Iron => "iron",
            OreKind::Gold => "gold",
            OreKind::Redstone => "redstone",
            OreKind::Lapis => "lapis",
            OreKind::Diamond => "diamond",
        }
    }

    pub fn from_name(name: &str) -> Option<OreKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn block(self) -> Block {
        match self {
            OreKind::Coal => Block::COAL_ORE,
            OreKind::Iron => Block::IRON_ORE,
            OreKind::Gold => Block::GOLD_ORE,
            OreKind::Redstone => Block::REDSTONE_ORE,
            OreKind::Lapis => Block::LAPIS_ORE,
            OreKind::Diamond => Block::DIAMOND_ORE,
        }
    }

    /// Relative frequency among ore candidates.
    pub fn weight(self) -> u32 {
        match self {
            OreKind::Coal => 20,
            OreKind::Iron => 12,
            OreKind::Gold => 4,
            OreKind::Redstone => 6,
            OreKind::Lapis => 3,
            OreKind::Diamond => 1,
        }
    }

    /// Highest y (above bedrock) a deposit may start at.
    pub fn max_y(self) -> i32 {
        match self {
            OreKind::Coal => 128,
            OreKind::Iron => 64,
            OreKind::Gold | OreKind::Lapis => 32,
            OreKind::Redstone | OreKind::Diamond => 16,
        }
    }
}
