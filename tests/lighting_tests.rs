use car_scene::car::Car;
use car_scene::lighting::{
    compose, headlights, static_point_lights, RecordingSink, TimeOfDay, UniformValue,
    CAR_POINT_DIFFUSE, POINT_LIGHT_POSITIONS, SPOT_LIGHT_COUNT,
};
use car_scene::types::SceneUniforms;
use car_scene::UniformSink;
use glam::Vec3;

const EPS: f32 = 1e-5;

#[cfg(test)]
mod composition_tests {
    use super::*;

    #[test]
    fn test_day_and_night_differ_only_in_sun_sky_and_fog() {
        let car = Car::default();
        let day = compose(&car, 0.5, TimeOfDay::Day);
        let night = compose(&car, 0.5, TimeOfDay::Night);

        assert_ne!(day.lights.sun.color, night.lights.sun.color);
        assert_ne!(day.sky_color, night.sky_color);
        assert_ne!(day.fog_color, night.fog_color);
        assert_eq!(day.lights.sun.direction, night.lights.sun.direction);
        assert_eq!(day.lights.point_lights, night.lights.point_lights);
        assert_eq!(day.lights.spotlights, night.lights.spotlights);
    }

    #[test]
    fn test_night_is_darker_than_day() {
        let car = Car::default();
        let day = compose(&car, 0.5, TimeOfDay::Day);
        let night = compose(&car, 0.5, TimeOfDay::Night);
        assert!(night.sky_color.length() < day.sky_color.length());
        assert!(night.lights.sun.color.diffuse.length() < day.lights.sun.color.diffuse.length());
    }

    #[test]
    fn test_point_lights_sit_at_fixed_positions() {
        let lights = static_point_lights();
        for (light, expected) in lights.iter().zip(POINT_LIGHT_POSITIONS) {
            assert_eq!(light.position, expected);
        }
    }

    #[test]
    fn test_headlights_follow_the_car() {
        let mut car = Car::default();
        let before = headlights(&car, 0.5);
        car.drive(4.0);
        let after = headlights(&car, 0.5);

        for i in 0..SPOT_LIGHT_COUNT {
            let moved = after[i].position - before[i].position;
            assert!((moved - car.forward() * 4.0).length() < 1e-3);
        }
    }

    #[test]
    fn test_headlights_share_direction() {
        let mut car = Car::default();
        car.rotate(1.0);
        car.aim_spotlight(0.2);
        let lights = headlights(&car, 0.5);
        assert_eq!(lights[0].direction, lights[1].direction);
        assert!((lights[0].direction - car.spotlight_direction()).length() < EPS);
        assert_ne!(lights[0].position, lights[1].position);
    }

    #[test]
    fn test_inner_cone_is_narrower() {
        for light in headlights(&Car::default(), 0.5) {
            assert!(light.cut_off > light.outer_cut_off);
        }
    }
}

#[cfg(test)]
mod uniform_sink_tests {
    use super::*;

    #[test]
    fn test_light_set_writes_every_field() {
        let lighting = compose(&Car::default(), 0.5, TimeOfDay::Day);
        let mut sink = RecordingSink::new();
        lighting.lights.apply(&mut sink);

        // dirLight 4, two point lights of 7, two spotlights of 10
        assert_eq!(sink.len(), 4 + 2 * 7 + 2 * 10);
        assert_eq!(sink.vec3("dirLight.direction"), Some(lighting.lights.sun.direction));
        assert_eq!(sink.vec3("pointLights[1].position"), Some(POINT_LIGHT_POSITIONS[1]));
        assert!(sink.float("spotLights[0].outerCutOff").is_some());
        assert!(sink.float("spotLights[2].cutOff").is_none());
    }

    #[test]
    fn test_car_lights_dim_point_diffuse_only() {
        let lighting = compose(&Car::default(), 0.5, TimeOfDay::Night);
        let car_lights = lighting.lights.with_point_diffuse(CAR_POINT_DIFFUSE);

        let mut world = RecordingSink::new();
        lighting.lights.apply(&mut world);
        let mut car = RecordingSink::new();
        car_lights.apply(&mut car);

        for name in world.names() {
            let dimmed = name.starts_with("pointLights") && name.ends_with(".diffuse");
            if dimmed {
                assert_eq!(car.vec3(name), Some(CAR_POINT_DIFFUSE));
            } else {
                assert_eq!(world.get(name), car.get(name), "{name} changed");
            }
        }
    }

    #[test]
    fn test_scene_uniforms_receive_the_same_values() {
        let mut car = Car::default();
        car.rotate(0.5);
        let lighting = compose(&car, 0.5, TimeOfDay::Day);

        let mut uniforms = SceneUniforms::default();
        lighting.lights.apply(&mut uniforms);

        let spot = &lighting.lights.spotlights[1];
        assert_eq!(uniforms.spot_lights[1].position, spot.position.to_array());
        assert_eq!(uniforms.spot_lights[1].outer_cut_off, spot.outer_cut_off);
        assert_eq!(uniforms.dir_light.diffuse, lighting.lights.sun.color.diffuse.to_array());
        assert_eq!(uniforms.point_lights[0].quadratic, 0.032);
    }

    #[test]
    fn test_scene_uniforms_flags_and_fog() {
        let mut uniforms = SceneUniforms::default();
        uniforms.set_bool("blinn", true);
        uniforms.set_f32("fogIntensity", 0.25);
        uniforms.set_vec3("fogColor", Vec3::splat(0.1));

        assert_eq!(uniforms.blinn, 1);
        assert_eq!(uniforms.fog_intensity, 0.25);
        assert_eq!(uniforms.fog_color, [0.1; 3]);

        uniforms.set("blinn", UniformValue::Bool(false));
        assert_eq!(uniforms.blinn, 0);
    }
}
