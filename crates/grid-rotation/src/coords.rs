//! Flattened coordinates of a regular grid.

/// Expand a lat × lon lattice into flattened `(lats, lons)`.
///
/// Latitude varies slowest and longitude fastest, matching the row-major
/// layout of [`GridField`](crate::GridField): entry `i_lat * nlon + i_lon`
/// holds `(lat_axis[i_lat], lon_axis[i_lon])`.
pub fn coordinate_pairs(lat_axis: &[f64], lon_axis: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = lat_axis.len() * lon_axis.len();
    let mut lats = Vec::with_capacity(n);
    let mut lons = Vec::with_capacity(n);

    for &lat in lat_axis {
        for &lon in lon_axis {
            lats.push(lat);
            lons.push(lon);
        }
    }

    (lats, lons)
}
