mod tests {
    use approx::assert_relative_eq;

    use crate::mass::{Mass, SOLAR_MASS_G};

    #[test]
    fn test_mass_conversions() {
        let mass_sm = Mass::from_solar_masses(1.0);
        assert_relative_eq!(mass_sm.to_grams(), SOLAR_MASS_G);

        let mass_g = Mass::from_grams(SOLAR_MASS_G * 8.0);
        assert_relative_eq!(mass_g.to_solar_masses(), 8.0);
    }

    #[test]
    fn test_mass_arithmetic_operations() {
        let mass1 = Mass::from_solar_masses(2.0);
        let mass2 = Mass::from_solar_masses(1.5);

        assert_relative_eq!((mass1 + mass2).to_solar_masses(), 3.5);
        assert_relative_eq!((mass1 - mass2).to_solar_masses(), 0.5);
        assert_relative_eq!((mass1 * 3.0).to_solar_masses(), 6.0);
        assert_relative_eq!((mass1 / 4.0).to_solar_masses(), 0.5);
        assert_relative_eq!((2.5 * mass2).to_solar_masses(), 3.75);
        assert_relative_eq!(mass1 / mass2, 4.0 / 3.0);

        let mut tally = Mass::zero();
        tally += mass1;
        tally -= mass2;
        assert_relative_eq!(tally.to_solar_masses(), 0.5);
    }

    #[test]
    fn test_mass_sum_over_population() {
        let stars = [0.3, 1.0, 8.0, 25.0].map(Mass::from_solar_masses);
        let total: Mass = stars.iter().sum();
        assert_relative_eq!(total.to_solar_masses(), 34.3, epsilon = 1e-12);
        assert!(Mass::zero().is_zero());
    }

    #[test]
    fn test_mass_serializes_as_bare_number() {
        let json = serde_json::to_string(&Mass::from_solar_masses(1.5)).unwrap();
        assert_eq!(json, "1.5");
    }
}
