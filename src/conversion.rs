use crate::constants::{ArcSec, Degree, Radian, ARCSEC_PER_DEG};

/// Convert an angle in degrees to arcseconds.
#[inline]
pub fn deg_to_arcsec(angle: Degree) -> ArcSec {
    angle * ARCSEC_PER_DEG
}

/// Great-circle separation between two points on the sphere, in radians.
///
/// Uses the Vincenty form of the angular-separation formula, which stays
/// well conditioned both for very small separations (where the plain
/// spherical law of cosines loses precision) and near antipodal points
/// (where the haversine form does).
///
/// Arguments
/// ---------
/// * `lon1`, `lat1`: first point (radians)
/// * `lon2`, `lat2`: second point (radians)
///
/// Return
/// ------
/// * the separation in radians, in `[0, π]`
pub fn angular_separation(lon1: Radian, lat1: Radian, lon2: Radian, lat2: Radian) -> Radian {
    let (sdlon, cdlon) = (lon2 - lon1).sin_cos();
    let (slat1, clat1) = lat1.sin_cos();
    let (slat2, clat2) = lat2.sin_cos();

    let num1 = clat2 * sdlon;
    let num2 = clat1 * slat2 - slat1 * clat2 * cdlon;
    let denominator = slat1 * slat2 + clat1 * clat2 * cdlon;

    num1.hypot(num2).atan2(denominator)
}

/// Great-circle separation between two equatorial positions given in degrees,
/// returned in arcseconds.
///
/// Arguments
/// ---------
/// * `ra1`, `dec1`: first position (degrees)
/// * `ra2`, `dec2`: second position (degrees)
///
/// Return
/// ------
/// * the separation in arcseconds
pub fn separation_arcsec(ra1: Degree, dec1: Degree, ra2: Degree, dec2: Degree) -> ArcSec {
    let sep = angular_separation(
        ra1.to_radians(),
        dec1.to_radians(),
        ra2.to_radians(),
        dec2.to_radians(),
    );
    deg_to_arcsec(sep.to_degrees())
}
