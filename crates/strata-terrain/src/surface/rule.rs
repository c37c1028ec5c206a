//! Surface rule and condition trees.

use strata_density::Identifier;

use crate::block::BlockId;

/// Which side of a solid run stone depth is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaveSurface {
    /// Downward from the top solid block.
    Floor,
    /// Upward from the lowest solid block above an opening.
    Ceiling,
}

/// A test evaluated at one block position.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCondition {
    /// True at or below `true_at_and_below`, false at or above
    /// `false_at_and_above`, and randomly in between with linearly falling
    /// probability.
    VerticalGradient {
        random_name: Identifier,
        true_at_and_below: i32,
        false_at_and_above: i32,
    },
    /// True above the preliminary (pre-carving) surface height.
    AbovePreliminarySurface,
    /// True within `offset` (+ surface depth, + secondary depth) blocks of the
    /// floor or ceiling.
    StoneDepth {
        offset: i32,
        add_surface_depth: bool,
        secondary_depth_range: i32,
        surface_type: CaveSurface,
    },
    /// True when the position is at or above the local water surface
    /// (shifted by `offset`), or when there is no water above.
    Water {
        offset: i32,
        surface_depth_multiplier: i32,
        add_stone_depth: bool,
    },
    /// True at or above `anchor`.
    YAbove {
        anchor: i32,
        surface_depth_multiplier: i32,
        add_stone_depth: bool,
    },
    /// True when the 2D noise lies in `min_threshold..=max_threshold`.
    NoiseThreshold {
        noise: Identifier,
        min_threshold: f64,
        max_threshold: f64,
    },
    Not(Box<SurfaceCondition>),
}

impl SurfaceCondition {
    pub fn stone_depth(offset: i32, add_surface_depth: bool, secondary_depth_range: i32) -> Self {
        Self::StoneDepth {
            offset,
            add_surface_depth,
            secondary_depth_range,
            surface_type: CaveSurface::Floor,
        }
    }

    pub fn water(offset: i32) -> Self {
        Self::Water {
            offset,
            surface_depth_multiplier: 0,
            add_stone_depth: false,
        }
    }

    pub fn y_above(anchor: i32) -> Self {
        Self::YAbove {
            anchor,
            surface_depth_multiplier: 0,
            add_stone_depth: false,
        }
    }

    pub fn vertical_gradient(random_name: Identifier, true_at_and_below: i32, false_at_and_above: i32) -> Self {
        Self::VerticalGradient {
            random_name,
            true_at_and_below,
            false_at_and_above,
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// A material assignment rule.
///
/// A [`Sequence`](Self::Sequence) yields the result of its first child that
/// yields anything. A [`Condition`](Self::Condition) whose test passes but
/// whose body yields nothing yields nothing, so the enclosing sequence
/// continues with its next child.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceRule {
    Block(BlockId),
    Sequence(Vec<SurfaceRule>),
    Condition {
        if_true: SurfaceCondition,
        then_run: Box<SurfaceRule>,
    },
}

impl SurfaceRule {
    pub fn block(block: &BlockId) -> Self {
        Self::Block(block.clone())
    }

    pub fn when(condition: SurfaceCondition, then_run: SurfaceRule) -> Self {
        Self::Condition {
            if_true: condition,
            then_run: Box::new(then_run),
        }
    }

    /// `then_run` guarded by every condition in `all`, outermost first.
    pub fn when_all(all: Vec<SurfaceCondition>, then_run: SurfaceRule) -> Self {
        all.into_iter()
            .rev()
            .fold(then_run, |rule, condition| Self::when(condition, rule))
    }

    /// Every block this rule can produce, in rule order.
    pub fn blocks(&self) -> Vec<&BlockId> {
        let mut out = Vec::new();
        self.collect_blocks(&mut out);
        out
    }

    fn collect_blocks<'a>(&'a self, out: &mut Vec<&'a BlockId>) {
        match self {
            Self::Block(block) => out.push(block),
            Self::Sequence(rules) => rules.iter().for_each(|r| r.collect_blocks(out)),
            Self::Condition { then_run, .. } => then_run.collect_blocks(out),
        }
    }
}
