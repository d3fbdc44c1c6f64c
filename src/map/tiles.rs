// Slippy map maths: Web Mercator projection and raster tile addressing
//
// World coordinates are normalized to [0, 1] on both axes, x growing east and
// y growing south, so a tile at zoom `z` covers a square of side `1 / 2^z`.

use std::f64::consts::PI;

use crate::workout::Coords;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_ZOOM: u8 = 19;
const MAX_LATITUDE: f64 = 85.051_128_78;
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

pub fn project(coords: Coords) -> WorldPoint {
    let lat_rad = coords.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    WorldPoint {
        x: (coords.lng + 180.0) / 360.0,
        y: (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0,
    }
}

pub fn unproject(point: WorldPoint) -> Coords {
    let lat_rad = (PI * (1.0 - 2.0 * point.y)).sinh().atan();
    Coords::new(lat_rad.to_degrees(), point.x * 360.0 - 180.0)
}

/// Size in world units of `pixels` screen pixels at `zoom`.
pub fn world_span(zoom: f64, pixels: f64) -> f64 {
    pixels / (TILE_SIZE * 2f64.powf(zoom))
}

/// Zoom level at which `span` world units fill `pixels` screen pixels.
pub fn zoom_for_span(span: f64, pixels: f64) -> f64 {
    (pixels / (TILE_SIZE * span)).log2()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// Top-left and bottom-right corners in world coordinates.
    pub fn bounds(&self) -> (WorldPoint, WorldPoint) {
        let side = 1.0 / f64::from(1u32 << self.zoom);
        let min = WorldPoint {
            x: f64::from(self.x) * side,
            y: f64::from(self.y) * side,
        };
        let max = WorldPoint {
            x: min.x + side,
            y: min.y + side,
        };
        (min, max)
    }

    /// Fill a `{s}/{z}/{x}/{y}` URL template for this tile.
    pub fn url(&self, template: &str) -> String {
        let subdomain = SUBDOMAINS[((self.x + self.y) % SUBDOMAINS.len() as u32) as usize];
        template
            .replace("{s}", subdomain)
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
            .replace("{r}", "")
    }
}

/// Tiles at `zoom` covering the world rectangle `min..max`, clamped to the world.
pub fn covering_tiles(min: WorldPoint, max: WorldPoint, zoom: u8) -> Vec<TileId> {
    let zoom = zoom.min(MAX_ZOOM);
    let n = 1u32 << zoom;
    let to_index =
        |v: f64| -> u32 { (v * f64::from(n)).floor().clamp(0.0, f64::from(n - 1)) as u32 };

    let (x0, x1) = (to_index(min.x.min(max.x)), to_index(min.x.max(max.x)));
    let (y0, y1) = (to_index(min.y.min(max.y)), to_index(min.y.max(max.y)));

    let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            tiles.push(TileId { zoom, x, y });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_origin_is_world_center() {
        let point = project(Coords::new(0.0, 0.0));
        assert!((point.x - 0.5).abs() < 1e-12);
        assert!((point.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let coords = Coords::new(40.4168, -3.7038);
        let back = unproject(project(coords));
        assert!((back.lat - coords.lat).abs() < 1e-9);
        assert!((back.lng - coords.lng).abs() < 1e-9);
    }

    #[test]
    fn test_known_tile_for_madrid() {
        // Madrid at zoom 13 lives in tile 4011/3088
        let point = project(Coords::new(40.4168, -3.7038));
        let tiles = covering_tiles(point, point, 13);
        assert_eq!(tiles, vec![TileId { zoom: 13, x: 4011, y: 3088 }]);
    }

    #[test]
    fn test_covering_tiles_clamps_to_world() {
        let tiles = covering_tiles(
            WorldPoint { x: -1.0, y: -1.0 },
            WorldPoint { x: 2.0, y: 2.0 },
            1,
        );
        assert_eq!(tiles.len(), 4);
    }

    #[test]
    fn test_tile_url_template() {
        let tile = TileId { zoom: 13, x: 4011, y: 3088 };
        assert_eq!(
            tile.url("https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png"),
            "https://b.tile.openstreetmap.fr/hot/13/4011/3088.png"
        );
    }

    #[test]
    fn test_zoom_and_span_agree() {
        let span = world_span(13.0, 800.0);
        assert!((zoom_for_span(span, 800.0) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_bounds() {
        let (min, max) = TileId { zoom: 1, x: 1, y: 0 }.bounds();
        assert_eq!(min, WorldPoint { x: 0.5, y: 0.0 });
        assert_eq!(max, WorldPoint { x: 1.0, y: 0.5 });
    }
}
