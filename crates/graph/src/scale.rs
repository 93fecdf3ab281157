use incident_protocol::DerivedNode;

pub const MIN_RADIUS: f64 = 5.0;
pub const MAX_RADIUS: f64 = 30.0;

/// Square-root scale from `[0, max_count]` to `[MIN_RADIUS, MAX_RADIUS]` px
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    max_count: u64,
}

impl RadiusScale {
    /// Domain upper bound is the largest node count, or 1 when every node is empty
    pub fn for_nodes(nodes: &[DerivedNode]) -> Self {
        let max_count = nodes.iter().map(|n| n.count).max().unwrap_or(0).max(1);
        Self { max_count }
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn radius(&self, count: u64) -> f64 {
        let t = (count as f64).sqrt() / (self.max_count as f64).sqrt();
        MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_scale_spans_radius_range() {
        let scale = RadiusScale { max_count: 100 };
        assert_eq!(scale.radius(0), MIN_RADIUS);
        assert_eq!(scale.radius(100), MAX_RADIUS);
        assert_eq!(scale.radius(25), 17.5);
    }

    #[test]
    fn empty_nodes_fall_back_to_unit_domain() {
        let scale = RadiusScale::for_nodes(&[DerivedNode::unmatched("x")]);
        assert_eq!(scale.max_count(), 1);
        assert_eq!(scale.radius(0), MIN_RADIUS);
        assert_eq!(RadiusScale::for_nodes(&[]).max_count(), 1);
    }
}
